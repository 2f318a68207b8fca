//! Meshkey Crypto - packet cipher layer
//!
//! This crate provides:
//! - AES-128-CTR keystream application (decryption and encryption are
//!   the same operation)
//! - Deterministic counter block construction from packet metadata
//! - Candidate key padding to the fixed cipher key size

pub mod cipher;
pub mod nonce;

pub use cipher::{decrypt, pad_key, CipherError, KEY_SIZE, NONCE_SIZE};
pub use nonce::packet_nonce;
