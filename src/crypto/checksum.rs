//! SHA-256 checksum trailer.
//!
//! ```text
//! [ payload ][ SHA-256(payload): 32 bytes ]
//! ```
//!
//! Validation failure is returned as `None` rather than an error so the
//! persistence engine can route it to the backup file.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Size of the trailer (SHA-256 = 32 bytes).
pub const CHECKSUM_LEN: usize = 32;

/// Append a digest of `bytes` when `enabled`; otherwise return them unchanged.
pub fn add_checksum(mut bytes: Vec<u8>, enabled: bool) -> Vec<u8> {
    if enabled {
        let digest = Sha256::digest(&bytes);
        bytes.extend_from_slice(&digest);
    }
    bytes
}

/// Strip and verify the trailer.
///
/// Returns the payload without trailer, or `None` when the input is too
/// short or the digest does not match.  When `enabled` is false the
/// whole input is the payload.
pub fn validate_checksum(bytes: &[u8], enabled: bool) -> Option<&[u8]> {
    if !enabled {
        return Some(bytes);
    }
    if bytes.len() < CHECKSUM_LEN {
        return None;
    }

    let (payload, stored) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let actual = Sha256::digest(payload);

    // Constant-time comparison to avoid timing side channels.
    if actual.as_slice().ct_eq(stored).into() {
        Some(payload)
    } else {
        None
    }
}
