//! Meshkey Core - encrypted-packet key recovery
//!
//! The search side of meshkey: enumerate a bounded short-key space,
//! decrypt a captured packet under each candidate, and keep the first key
//! whose plaintext looks like a real frame. Frontends (dashboard TUI,
//! future web view, etc.) call [`search::search`] and consume its
//! progress callback; everything else here is the machinery under it.

pub mod frame;
pub mod keyspace;
pub mod ports;
pub mod search;

pub use frame::{extract, validate, Confidence, Extracted, Payload, Validation};
pub use keyspace::KeySpace;
pub use search::{search, SearchConfig, SearchError, SearchProgress, SearchResult};
