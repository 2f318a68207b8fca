//! AES-128-CTR keystream application
//!
//! Counter mode turns the block cipher into a stream cipher, so decrypt
//! and encrypt are the same XOR. The consequence that matters here: a
//! wrong key never fails, it just produces same-length garbage. Whether
//! the output is a real packet is for the caller to judge.
//!
//! The counter field is the trailing 64 bits of the block, incremented
//! big-endian; the leading 64 bits are a fixed nonce prefix.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr64BE;
use thiserror::Error;
use zeroize::Zeroizing;

/// 128-bit key (16 bytes)
pub const KEY_SIZE: usize = 16;
/// 128-bit counter block (16 bytes)
pub const NONCE_SIZE: usize = 16;

type Aes128Ctr = Ctr64BE<Aes128>;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Invalid key size: expected {KEY_SIZE}, got {0}")]
    InvalidKeySize(usize),

    #[error("Invalid nonce size: expected {NONCE_SIZE}, got {0}")]
    InvalidNonceSize(usize),
}

/// Apply the AES-128-CTR keystream for `key` and `nonce` to `ciphertext`.
///
/// Only malformed key or nonce lengths can fail. Feeding the same bytes
/// back through with the same key and nonce recovers the original input,
/// which is how tests build known ciphertexts.
pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>, CipherError> {
    if key.len() != KEY_SIZE {
        return Err(CipherError::InvalidKeySize(key.len()));
    }
    if nonce.len() != NONCE_SIZE {
        return Err(CipherError::InvalidNonceSize(nonce.len()));
    }

    let mut cipher = Aes128Ctr::new_from_slices(key, nonce)
        .map_err(|_| CipherError::InvalidKeySize(key.len()))?;

    let mut plaintext = ciphertext.to_vec();
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}

/// Right-pad a short candidate key with zero bytes to the full cipher key size.
///
/// Original bytes keep their positions; the buffer is scrubbed on drop.
pub fn pad_key(short: &[u8]) -> Zeroizing<[u8; KEY_SIZE]> {
    let mut key = [0u8; KEY_SIZE];
    let take = short.len().min(KEY_SIZE);
    key[..take].copy_from_slice(&short[..take]);
    Zeroizing::new(key)
}
