//! Key search orchestration
//!
//! Drives the whole pipeline: enumerate candidates, pad each to the
//! cipher key size, decrypt the captured packet, judge the plaintext,
//! and stop at the first structural match. Frontends provide a progress
//! callback and an optional cancellation flag; the loop yields to the
//! runtime between chunks so a single-threaded host stays responsive
//! through depth-3 and depth-4 sweeps.

use crate::frame::{self, Confidence, Payload, Validation};
use crate::keyspace::{KeySpace, MAX_DEPTH, MIN_DEPTH};
use meshkey_crypto::{decrypt, packet_nonce, pad_key};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

/// Candidates processed between progress reports and yield points
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Key depth must be {MIN_DEPTH}-{MAX_DEPTH} bytes, got {0}")]
    InvalidDepth(u32),
}

/// One search invocation's inputs. Read-only for the duration.
pub struct SearchConfig {
    /// Captured packet ciphertext
    pub ciphertext: Vec<u8>,
    /// Packet identifier from the cleartext header
    pub packet_id: u32,
    /// Sender node identifier from the cleartext header
    pub from_node: u32,
    /// Candidate key length in bytes (1-4)
    pub depth: u32,
    /// Candidates per chunk; progress and cancellation only happen at
    /// chunk boundaries
    pub chunk_size: usize,
    /// Cooperative stop flag, checked between chunks
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchConfig {
    pub fn new(ciphertext: Vec<u8>, packet_id: u32, from_node: u32, depth: u32) -> Self {
        Self {
            ciphertext,
            packet_id,
            from_node,
            depth,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: None,
        }
    }
}

/// Snapshot handed to the progress callback at each chunk boundary
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchProgress {
    /// Candidates tried so far
    pub current: u64,
    /// Size of the whole space (256^depth)
    pub total: u64,
    /// Throughput since the search started, rounded
    pub keys_per_sec: u64,
}

/// A recovered key and what it decrypted to
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The short key as enumerated (1-4 bytes)
    pub key: Vec<u8>,
    /// "0x"-prefixed lowercase hex of the short key
    pub key_hex: String,
    /// Full decrypted packet bytes
    pub plaintext: Vec<u8>,
    /// Port number, when the frame carried one
    pub port: Option<u8>,
    /// Payload field, when one was found
    pub payload: Option<Payload>,
    /// How trustworthy the match is
    pub confidence: Confidence,
}

/// Sweep the key space for a key that decrypts `config.ciphertext` into a
/// recognizable frame.
///
/// Returns `Ok(Some(..))` for the first structural match, `Ok(None)` when
/// the space is exhausted or the cancel flag was raised. The two terminal
/// outcomes are indistinguishable here; a caller that needs to know
/// inspects its own flag. `on_progress` fires once per chunk, never per
/// candidate. Every call starts over from index 0.
pub async fn search<F>(
    config: &SearchConfig,
    mut on_progress: F,
) -> Result<Option<SearchResult>, SearchError>
where
    F: FnMut(SearchProgress),
{
    let mut space =
        KeySpace::new(config.depth).ok_or(SearchError::InvalidDepth(config.depth))?;
    let total = space.total();

    // One counter block per search: it depends only on the packet header,
    // never on the key.
    let nonce = packet_nonce(config.packet_id, config.from_node);

    debug!(depth = config.depth, total, "starting key search");
    let started = Instant::now();
    let mut current: u64 = 0;

    while !cancelled(&config.cancel) {
        let mut pulled = 0usize;

        for candidate in space.by_ref().take(config.chunk_size) {
            pulled += 1;
            current += 1;

            let key = pad_key(&candidate);
            // A wrong key cannot fail here; an error means malformed
            // lengths, so skip the candidate rather than abort the sweep.
            let plaintext = match decrypt(&config.ciphertext, &*key, &nonce) {
                Ok(plain) => plain,
                Err(_) => continue,
            };

            let verdict = frame::validate(&plaintext);
            if verdict.valid {
                debug!(key = %hex::encode(&candidate), tried = current, "structural match");
                return Ok(Some(build_result(candidate, plaintext, verdict)));
            }
        }

        if pulled == 0 {
            debug!(tried = current, "key space exhausted");
            return Ok(None);
        }

        trace!(current, total, "chunk complete");
        on_progress(SearchProgress {
            current,
            total,
            keys_per_sec: keys_per_sec(current, started),
        });

        // Hand control back to the host between chunks; a long sweep
        // would otherwise starve a single-threaded UI.
        tokio::task::yield_now().await;
    }

    debug!(tried = current, "search cancelled");
    Ok(None)
}

fn cancelled(flag: &Option<Arc<AtomicBool>>) -> bool {
    flag.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
}

fn keys_per_sec(current: u64, started: Instant) -> u64 {
    let elapsed = started.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        (current as f64 / elapsed).round() as u64
    } else {
        0
    }
}

fn build_result(key: Vec<u8>, plaintext: Vec<u8>, verdict: Validation) -> SearchResult {
    let found = frame::extract(&plaintext);
    SearchResult {
        key_hex: format!("0x{}", hex::encode(&key)),
        key,
        plaintext,
        port: verdict.port,
        payload: found.payload,
        confidence: verdict.confidence,
    }
}
