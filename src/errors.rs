use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in inivault.
#[derive(Debug, Error)]
pub enum StoreError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong passphrase or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- File format errors ---
    #[error("Checksum mismatch in {0}: file is corrupted or was edited")]
    ChecksumMismatch(PathBuf),

    #[error("Invalid file format in {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    // --- Store errors ---
    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    #[error("Key '{key}' not found in section '{section}'")]
    KeyNotFound { section: String, key: String },

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Store has been disposed")]
    Disposed,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes the persistence engine routes on.
///
/// `Io` and `Integrity` are recovered through the backup file; a
/// `Cryptographic` failure that survives the backup attempt is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Io,
    Integrity,
    Cryptographic,
    Other,
}

impl StoreError {
    /// Classify this error for backup-fallback routing.
    pub fn class(&self) -> FailureClass {
        match self {
            StoreError::Io(_) => FailureClass::Io,
            StoreError::ChecksumMismatch(_) | StoreError::InvalidFormat { .. } => {
                FailureClass::Integrity
            }
            StoreError::DecryptionFailed => FailureClass::Cryptographic,
            _ => FailureClass::Other,
        }
    }
}

/// Convenience type alias for inivault results.
pub type Result<T> = std::result::Result<T, StoreError>;
