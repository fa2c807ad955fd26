//! On-disk byte layout of a store file.
//!
//! ```text
//! [optional header text][IV: 16 bytes][ciphertext]   (encrypted)
//! [optional header text][UTF-8 INI text]             (plain)
//! [SHA-256: 32 bytes]                                (checksum enabled)
//! ```
//!
//! - **Header**: literal text chosen by the caller (e.g. a "do not edit"
//!   comment).  Always newline-terminated on disk.
//! - **Body**: the text-codec payload, AES-256-GCM encrypted when a key
//!   is configured.
//! - **Checksum**: digest over every byte that precedes it.

use std::path::Path;

use crate::crypto::checksum::{add_checksum, validate_checksum, CHECKSUM_LEN};
use crate::crypto::encryption::{decrypt, encrypt, IV_LEN, TAG_LEN};
use crate::crypto::kdf::MasterKey;
use crate::errors::{Result, StoreError};

/// Framing applied around the text payload.
#[derive(Debug)]
pub struct Framing {
    header: Option<String>,
    key: Option<MasterKey>,
    checksum: bool,
}

impl Framing {
    pub fn new(header: Option<&str>, key: Option<MasterKey>, checksum: bool) -> Self {
        let header = header.filter(|h| !h.is_empty()).map(|h| {
            if h.ends_with('\n') {
                h.to_string()
            } else {
                format!("{h}\n")
            }
        });
        Self {
            header,
            key,
            checksum,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    pub fn has_checksum(&self) -> bool {
        self.checksum
    }

    fn header_bytes(&self) -> &[u8] {
        self.header.as_deref().map(str::as_bytes).unwrap_or_default()
    }

    /// Smallest file that could possibly hold a valid store.
    pub fn min_len(&self) -> usize {
        let mut len = self.header_bytes().len();
        if self.checksum {
            len += CHECKSUM_LEN;
        }
        if self.key.is_some() {
            len += IV_LEN + TAG_LEN;
        }
        len
    }

    /// Wrap a text payload for writing.
    ///
    /// A fresh IV is generated on every call, so two encodings of the
    /// same payload never produce the same bytes.
    pub fn encode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut out = self.header_bytes().to_vec();
        match &self.key {
            Some(key) => out.extend_from_slice(&encrypt(key.as_bytes(), payload)?),
            None => out.extend_from_slice(payload),
        }
        Ok(add_checksum(out, self.checksum))
    }

    /// Unwrap file bytes back to the text payload.
    ///
    /// Errors are classified: `InvalidFormat` and `ChecksumMismatch` are
    /// integrity failures, `DecryptionFailed` is cryptographic.
    pub fn decode(&self, data: &[u8], path: &Path) -> Result<Vec<u8>> {
        if data.len() < self.min_len() {
            return Err(StoreError::InvalidFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "file is {} bytes, at least {} required",
                    data.len(),
                    self.min_len()
                ),
            });
        }

        let framed = validate_checksum(data, self.checksum)
            .ok_or_else(|| StoreError::ChecksumMismatch(path.to_path_buf()))?;

        let header = self.header_bytes();
        let body = match framed.strip_prefix(header) {
            Some(body) => body,
            // A plain file may have had its banner edited by hand; the
            // text codec skips comment lines anyway.
            None if self.key.is_none() => framed,
            None => {
                return Err(StoreError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason: "header does not match".into(),
                })
            }
        };

        match &self.key {
            Some(key) => decrypt(key.as_bytes(), body),
            None => Ok(body.to_vec()),
        }
    }
}
