//! Store module: the thread-safe handle callers work with.
//!
//! This module provides:
//! - `Encryption`, the choice of passphrase source (`key_source`)
//! - `IniStore` and its `StoreBuilder` (`handle`)

pub mod handle;
pub mod key_source;

// Re-export the most commonly used items.
pub use handle::{IniStore, StoreBuilder};
pub use key_source::Encryption;
