//! AES-256-GCM authenticated encryption with a 16-byte IV.
//!
//! Each call to `encrypt` generates a fresh random 16-byte IV and
//! prepends it to the ciphertext.  `decrypt` splits the IV back out
//! before decrypting.  GCM authenticates the ciphertext, so a wrong key
//! or a flipped bit always surfaces as `DecryptionFailed` instead of
//! silently producing garbage plaintext.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte IV | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AeadCore, AesGcm, Nonce};

use crate::errors::{Result, StoreError};

/// AES-256-GCM instantiated with a 128-bit IV.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Size of the IV in bytes.
pub const IV_LEN: usize = 16;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the IV prepended to the ciphertext (IV || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm16::new_from_slice(key)
        .map_err(|e| StoreError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let iv = Aes256Gcm16::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&iv, plaintext)
        .map_err(|e| StoreError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(IV_LEN + ciphertext.len());
    output.extend_from_slice(&iv);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Expects the first 16 bytes to be the IV, followed by the ciphertext.
pub fn decrypt(key: &[u8], iv_and_ciphertext: &[u8]) -> Result<Vec<u8>> {
    if iv_and_ciphertext.len() < IV_LEN + TAG_LEN {
        return Err(StoreError::DecryptionFailed);
    }

    let (iv_bytes, ciphertext) = iv_and_ciphertext.split_at(IV_LEN);
    let iv = Nonce::<U16>::from_slice(iv_bytes);

    let cipher = Aes256Gcm16::new_from_slice(key).map_err(|_| StoreError::DecryptionFailed)?;

    cipher
        .decrypt(iv, ciphertext)
        .map_err(|_| StoreError::DecryptionFailed)
}
