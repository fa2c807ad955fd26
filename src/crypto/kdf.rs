//! Passphrase-based key derivation using Argon2id.
//!
//! The on-disk format carries no salt, so the key must be reproducible
//! from the passphrase alone.  A fixed application salt is used; the
//! passphrase (explicit, or derived from machine identity) supplies all
//! of the entropy.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroize;

use crate::errors::{Result, StoreError};

/// Fixed salt bound to this file format.
const APP_SALT: &[u8] = b"inivault/settings-key/v1";

/// AES-256 key size.
pub const KEY_LEN: usize = 32;

/// Lowest accepted memory cost, in KiB.
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters, taken from `StoreOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// KiB of memory per derivation.
    pub memory_kib: u32,
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The cheapest parameters `derive_key` accepts.
    pub fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Derive a 32-byte key from a passphrase with explicit Argon2id parameters.
///
/// The same passphrase + params always produce the same key.
/// Parameters below [`Argon2Params::minimum`] are rejected.
pub fn derive_key(passphrase: &[u8], argon2_params: &Argon2Params) -> Result<MasterKey> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(StoreError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(StoreError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(StoreError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| StoreError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase, APP_SALT, &mut key)
        .map_err(|e| StoreError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    let master = MasterKey::new(key);
    key.zeroize();
    Ok(master)
}

/// A 32-byte encryption key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}
