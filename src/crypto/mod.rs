//! Cryptographic primitives for inivault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with a 16-byte IV (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - Machine/user identity for auto-derived passphrases (`identity`)
//! - SHA-256 checksum trailer framing (`checksum`)

pub mod checksum;
pub mod encryption;
pub mod identity;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use checksum::{add_checksum, validate_checksum, CHECKSUM_LEN};
pub use encryption::{decrypt, encrypt, IV_LEN, TAG_LEN};
pub use identity::{IdentityProvider, StaticIdentity, SystemIdentity};
pub use kdf::{derive_key, Argon2Params, MasterKey};
