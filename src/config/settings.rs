use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, StoreError};

/// Behaviour flags for an `IniStore`, optionally loaded from TOML.
///
/// Every field has a sensible default so a store works out-of-the-box
/// without any options file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Save automatically after mutations.
    #[serde(default = "default_true")]
    pub autosave: bool,

    /// Mutations between automatic saves (0 or 1 = every mutation).
    #[serde(default)]
    pub autosave_interval: u64,

    /// Keep the previous file as `<path>.backup` on every save.
    #[serde(default = "default_true")]
    pub autobackup: bool,

    /// Insert the caller's default when reading a missing key.
    #[serde(default)]
    pub autocreate: bool,

    /// Append and verify a SHA-256 trailer.
    #[serde(default = "default_true")]
    pub checksum: bool,

    /// Save once more when the store is disposed.
    #[serde(default = "default_true")]
    pub save_on_dispose: bool,

    /// Literal text written at the top of the file, e.g. a warning
    /// comment.  Plain files should start it with `;`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// KDF memory cost in KiB.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// KDF passes over memory.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// KDF lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Field defaults ───────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            autosave: true,
            autosave_interval: 0,
            autobackup: true,
            autocreate: false,
            checksum: true,
            save_on_dispose: true,
            header: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl StoreOptions {
    /// Load options from a TOML file.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents).map_err(|e| {
            StoreError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Number of mutations that trigger one autosave (never zero).
    pub fn effective_interval(&self) -> u64 {
        self.autosave_interval.max(1)
    }

    /// The KDF cost as crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Use the cheapest accepted Argon2 parameters.  Meant for tests.
    pub fn with_fast_kdf(mut self) -> Self {
        let fast = Argon2Params::minimum();
        self.argon2_memory_kib = fast.memory_kib;
        self.argon2_iterations = fast.iterations;
        self.argon2_parallelism = fast.parallelism;
        self
    }
}

// ── Tests ────────────────────────────────────────────────────────────
