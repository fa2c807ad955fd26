//! Save and load protocol for one store file.
//!
//! Save: snapshot → frame (encrypt, checksum) → `<path>.tmp` → commit
//! with optional backup capture.
//!
//! Load: primary, then `<path>.backup`.  IO and integrity failures fall
//! back to the backup and finally to an empty document.  A decryption
//! failure is never papered over: if neither file can be read, it is
//! returned to the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};

use super::atomic;
use super::format::Framing;
use crate::errors::{FailureClass, Result, StoreError};
use crate::ini::{self, Document};

/// Callback invoked for every failure the engine recovers from or reports.
pub type ErrorHandler = Arc<dyn Fn(&StoreError) + Send + Sync>;

/// Which file a load was satisfied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    /// Neither file held usable data.
    Empty,
}

/// Result of a successful load.
#[derive(Debug)]
pub struct Loaded {
    pub document: Document,
    pub source: LoadSource,
}

/// Outcome of reading one candidate file.
enum Attempt {
    Loaded(Document),
    Missing,
    Failed(StoreError),
}

/// Persistence engine bound to one primary path.
pub struct Engine {
    path: PathBuf,
    backup_path: PathBuf,
    autobackup: bool,
    framing: Framing,
    on_error: Option<ErrorHandler>,
    /// False after the primary failed validation; the next commit must
    /// not capture it as the backup.
    primary_trusted: AtomicBool,
    /// Keeps snapshot-and-write serial for this handle.
    io_lock: Mutex<()>,
}

impl Engine {
    pub fn new(path: &Path, framing: Framing, autobackup: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            backup_path: atomic::backup_path(path),
            autobackup,
            framing,
            on_error: None,
            primary_trusted: AtomicBool::new(true),
            io_lock: Mutex::new(()),
        }
    }

    /// Install the error channel.
    pub fn with_error_handler(mut self, handler: Option<ErrorHandler>) -> Self {
        self.on_error = handler;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    fn lock_io(&self) -> MutexGuard<'_, ()> {
        // The guarded state is `()`, so a poisoned lock carries no broken invariant.
        self.io_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Send `err` through the error channel and the log.
    pub fn report(&self, err: &StoreError) {
        warn!("{}: {err} ({:?})", self.path.display(), err.class());
        if let Some(handler) = &self.on_error {
            handler(err);
        }
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Snapshot and persist atomically.
    ///
    /// `snapshot` runs while this handle's IO lock is held, so saves
    /// issued later always write a snapshot at least as new as earlier
    /// ones.  A `None` snapshot writes nothing and returns `Ok(false)`.
    /// Failures are reported through the error channel and returned; the
    /// previous primary file stays valid either way.
    pub fn save_with<F>(&self, snapshot: F) -> Result<bool>
    where
        F: FnOnce() -> Option<Vec<u8>>,
    {
        let _io = self.lock_io();
        let Some(payload) = snapshot() else {
            return Ok(false);
        };
        match self.write_and_commit(&payload) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    fn write_and_commit(&self, payload: &[u8]) -> Result<()> {
        let tmp = self.stage(payload)?;
        let backup = (self.autobackup && self.primary_trusted.load(Ordering::Acquire))
            .then_some(self.backup_path.as_path());

        if let Err(e) = atomic::commit(&tmp, &self.path, backup) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        self.primary_trusted.store(true, Ordering::Release);
        debug!("committed {} (backup: {})", self.path.display(), backup.is_some());
        Ok(())
    }

    /// Frame `payload` and write it to the temp file without touching
    /// the primary.  Returns the temp path.
    pub fn stage(&self, payload: &[u8]) -> Result<PathBuf> {
        let bytes = self.framing.encode(payload)?;
        let tmp = atomic::write_temp(&self.path, &bytes)?;
        debug!("staged {} ({} bytes)", tmp.display(), bytes.len());
        Ok(tmp)
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Load the primary file, falling back to the backup.
    ///
    /// Returns an empty document when neither file exists or both fail
    /// IO/integrity checks.  Returns `DecryptionFailed` when a file
    /// failed to decrypt and no file could be loaded instead.
    pub fn load(&self) -> Result<Loaded> {
        let _io = self.lock_io();

        let primary = self.attempt(&self.path);
        let primary_failure = match primary {
            Attempt::Loaded(document) => {
                self.primary_trusted.store(true, Ordering::Release);
                debug!("loaded {}", self.path.display());
                return Ok(Loaded {
                    document,
                    source: LoadSource::Primary,
                });
            }
            Attempt::Missing => None,
            Attempt::Failed(e) => {
                self.primary_trusted.store(false, Ordering::Release);
                self.report(&e);
                Some(e.class())
            }
        };

        let backup_failure = match self.attempt(&self.backup_path) {
            Attempt::Loaded(document) => {
                info!("recovered from {}", self.backup_path.display());
                return Ok(Loaded {
                    document,
                    source: LoadSource::Backup,
                });
            }
            Attempt::Missing => None,
            Attempt::Failed(e) => {
                self.report(&e);
                Some(e.class())
            }
        };

        let cryptographic = [primary_failure, backup_failure]
            .contains(&Some(FailureClass::Cryptographic));
        if cryptographic {
            error!("{}: no file could be decrypted", self.path.display());
            return Err(StoreError::DecryptionFailed);
        }

        Ok(Loaded {
            document: Document::new(),
            source: LoadSource::Empty,
        })
    }

    fn attempt(&self, path: &Path) -> Attempt {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Attempt::Missing,
            Err(e) => return Attempt::Failed(e.into()),
        };

        match self.framing.decode(&data, path) {
            Ok(payload) => Attempt::Loaded(ini::parse(&payload)),
            Err(e) => Attempt::Failed(e),
        }
    }

    /// Delete the primary, backup and temp files.
    pub fn remove_files(&self) -> Result<()> {
        let _io = self.lock_io();
        atomic::remove_all(&self.path)?;
        Ok(())
    }
}
