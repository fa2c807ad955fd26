//! The thread-safe store handle.
//!
//! `IniStore` wraps the in-memory `Document` in a reader/writer lock and
//! the persistence `Engine` that writes it out.  Reads hold the shared
//! lock only for the lookup; mutations hold the exclusive lock only for
//! the change itself.  File IO always happens outside the document lock.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use zeroize::Zeroizing;

use super::key_source::Encryption;
use crate::config::StoreOptions;
use crate::errors::{Result, StoreError};
use crate::ini::{self, Document, IniValue, SearchHit, Section};
use crate::persist::{Engine, ErrorHandler, Framing, LoadSource};

const ACTIVE: u8 = 0;
const DISPOSED: u8 = 1;
const DELETED: u8 = 2;

/// Builder for [`IniStore`].
pub struct StoreBuilder {
    path: PathBuf,
    options: StoreOptions,
    encryption: Encryption,
    on_error: Option<ErrorHandler>,
}

impl StoreBuilder {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: StoreOptions::default(),
            encryption: Encryption::None,
            on_error: None,
        }
    }

    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Callback for failures that are recovered from or happen off the
    /// caller's path (backup fallback, autosave).
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&StoreError) + Send + Sync + 'static,
    {
        self.on_error = Some(std::sync::Arc::new(handler));
        self
    }

    /// Derive the key, load the file (with backup fallback) and return
    /// the handle.  A missing file is created empty.
    pub fn open(self) -> Result<IniStore> {
        let resolved = self.encryption.resolve(&self.options.argon2_params())?;
        let (passphrase, key) = match resolved {
            Some((passphrase, key)) => (Some(passphrase), Some(key)),
            None => (None, None),
        };

        let framing = Framing::new(self.options.header.as_deref(), key, self.options.checksum);
        let engine = Engine::new(&self.path, framing, self.options.autobackup)
            .with_error_handler(self.on_error);

        let loaded = engine.load()?;
        debug!("opened {} from {:?}", self.path.display(), loaded.source);

        let store = IniStore {
            document: RwLock::new(loaded.document),
            engine,
            options: self.options,
            passphrase,
            pending: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
            state: AtomicU8::new(ACTIVE),
        };

        // Writes the initial file when the primary is missing.
        store.save()?;

        Ok(store)
    }
}

/// A persistent, optionally encrypted INI store.
///
/// Share it between threads with `Arc<IniStore>`.  Every operation fails
/// with `StoreError::Disposed` once `dispose` or `delete` has run.
pub struct IniStore {
    document: RwLock<Document>,
    engine: Engine,
    options: StoreOptions,
    passphrase: Option<Zeroizing<String>>,
    /// Mutations since the last save.
    pending: AtomicU64,
    /// The document differs from what was last written.  Only changed
    /// under the document lock.
    dirty: AtomicBool,
    state: AtomicU8,
}

impl IniStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (or create) the store at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        options: StoreOptions,
        encryption: Encryption,
    ) -> Result<Self> {
        StoreBuilder::new(path)
            .options(options)
            .encryption(encryption)
            .open()
    }

    pub fn builder(path: impl AsRef<Path>) -> StoreBuilder {
        StoreBuilder::new(path)
    }

    // ------------------------------------------------------------------
    // Locking helpers
    // ------------------------------------------------------------------

    fn ensure_active(&self) -> Result<()> {
        if self.state.load(Ordering::Acquire) == ACTIVE {
            Ok(())
        } else {
            Err(StoreError::Disposed)
        }
    }

    // Document operations never leave it half-updated, so a poisoned
    // lock still guards a consistent value.
    fn read_lock(&self) -> RwLockReadGuard<'_, Document> {
        self.document.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Document> {
        self.document.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` against the document under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> Result<R> {
        self.ensure_active()?;
        Ok(f(&self.read_lock()))
    }

    /// Run `f` under the exclusive lock, then apply the autosave policy
    /// if `f` reports a change.
    fn mutate<R>(&self, f: impl FnOnce(&mut Document) -> (R, bool)) -> Result<R> {
        self.ensure_active()?;
        let (result, changed) = {
            let mut doc = self.write_lock();
            let (result, changed) = f(&mut doc);
            if changed {
                self.dirty.store(true, Ordering::Release);
            }
            (result, changed)
        };
        if changed {
            self.after_mutation();
        }
        Ok(result)
    }

    /// Count a mutation and save when the interval is reached.
    ///
    /// Autosave failures are already reported through the error channel
    /// and do not fail the mutation that triggered them.
    fn after_mutation(&self) {
        if !self.options.autosave {
            return;
        }
        let count = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if count % self.options.effective_interval() == 0 {
            let _ = self.save_snapshot();
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn has_section(&self, section: &str) -> Result<bool> {
        self.read(|doc| doc.has_section(section))
    }

    pub fn has_key(&self, section: &str, key: &str) -> Result<bool> {
        self.read(|doc| doc.has_key(section, key))
    }

    /// All section names, sorted.
    pub fn sections(&self) -> Result<Vec<String>> {
        self.read(Document::section_names)
    }

    /// Key names of a section; empty if the section does not exist.
    pub fn keys(&self, section: &str) -> Result<Vec<String>> {
        self.read(|doc| {
            doc.section(section)
                .map(|s| s.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Raw string value.
    pub fn get(&self, section: &str, key: &str) -> Result<Option<String>> {
        self.read(|doc| doc.get(section, key).map(str::to_string))
    }

    /// Copy of a whole section.
    pub fn section(&self, section: &str) -> Result<Option<Section>> {
        self.read(|doc| doc.section(section).cloned())
    }

    /// Substring search over keys and values of every section.
    pub fn search(&self, needle: &str, ignore_case: bool) -> Result<Vec<SearchHit>> {
        self.read(|doc| doc.search(needle, ignore_case))
    }

    /// Typed read with a default.
    ///
    /// An unparsable stored value yields `default`.  When the key is
    /// missing and `autocreate` is on, `default` is stored.  Racing
    /// callers insert at most once: after taking the exclusive lock the
    /// key is checked again, and a value inserted in between wins.
    pub fn get_value<T: IniValue>(&self, section: &str, key: &str, default: T) -> Result<T> {
        self.ensure_active()?;

        {
            let doc = self.read_lock();
            if let Some(raw) = doc.get(section, key) {
                return Ok(convert(section, key, raw, default));
            }
        }

        if !self.options.autocreate {
            return Ok(default);
        }
        validate_section_name(section)?;
        validate_key_name(key)?;

        let formatted = default.to_ini();
        validate_value(key, &formatted)?;

        let (stored, inserted) = {
            let mut doc = self.write_lock();
            match doc.get(section, key) {
                Some(existing) => (existing.to_string(), false),
                None => {
                    doc.set(section, key, &formatted);
                    self.dirty.store(true, Ordering::Release);
                    let stored = doc.get(section, key).unwrap_or_default().to_string();
                    (stored, true)
                }
            }
        };

        if inserted {
            debug!("autocreated [{section}] {key}");
            self.after_mutation();
        }
        Ok(convert(section, key, &stored, default))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Store a raw string value, creating the section if needed.
    pub fn set(&self, section: &str, key: &str, value: &str) -> Result<()> {
        validate_section_name(section)?;
        validate_key_name(key)?;
        validate_value(key, value)?;
        self.mutate(|doc| ((), doc.set(section, key, value)))
    }

    /// Store a typed value.
    pub fn set_value<T: IniValue>(&self, section: &str, key: &str, value: &T) -> Result<()> {
        self.set(section, key, &value.to_ini())
    }

    /// Add an empty section. Returns `false` if it already existed.
    pub fn add_section(&self, section: &str) -> Result<bool> {
        validate_section_name(section)?;
        self.mutate(|doc| {
            let added = doc.add_section(section);
            (added, added)
        })
    }

    /// Add a key only if absent. Returns `false` if it already existed.
    pub fn add_key(&self, section: &str, key: &str, value: &str) -> Result<bool> {
        validate_section_name(section)?;
        validate_key_name(key)?;
        validate_value(key, value)?;
        self.mutate(|doc| {
            let added = doc.add_key(section, key, value);
            (added, added)
        })
    }

    /// Returns `true` if the key existed.
    pub fn remove_key(&self, section: &str, key: &str) -> Result<bool> {
        self.mutate(|doc| {
            let removed = doc.remove_key(section, key).is_some();
            (removed, removed)
        })
    }

    /// Returns `true` if the section existed.
    pub fn remove_section(&self, section: &str) -> Result<bool> {
        self.mutate(|doc| {
            let removed = doc.remove_section(section).is_some();
            (removed, removed)
        })
    }

    pub fn rename_key(&self, section: &str, from: &str, to: &str) -> Result<()> {
        validate_key_name(to)?;
        self.mutate(|doc| {
            let result = doc.rename_key(section, from, to);
            let changed = result.is_ok() && from != to;
            (result, changed)
        })?
    }

    pub fn rename_section(&self, from: &str, to: &str) -> Result<()> {
        validate_section_name(to)?;
        self.mutate(|doc| {
            let result = doc.rename_section(from, to);
            let changed = result.is_ok() && from != to;
            (result, changed)
        })?
    }

    /// Remove every key of a section, keeping the section.
    pub fn clear_section(&self, section: &str) -> Result<()> {
        self.mutate(|doc| {
            let result = doc.clear_section(section);
            let changed = result.is_ok();
            (result, changed)
        })?
    }

    /// Remove every section.
    pub fn clear(&self) -> Result<()> {
        self.mutate(|doc| {
            let changed = !doc.is_empty();
            doc.clear();
            ((), changed)
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the current contents to disk now.
    ///
    /// Nothing is written when the contents are unchanged since the last
    /// save or load and the primary file exists, so the backup keeps the
    /// previous version.
    pub fn save(&self) -> Result<()> {
        self.ensure_active()?;
        self.save_snapshot()
    }

    /// Save if dirty (or the primary is missing) and still active.
    ///
    /// The state and dirty checks run under the engine's IO lock, so a
    /// save racing `delete` cannot recreate the removed files.
    fn save_snapshot(&self) -> Result<()> {
        let result = self.engine.save_with(|| {
            if !self.is_active() {
                return None;
            }
            let doc = self.read_lock();
            let dirty = self.dirty.swap(false, Ordering::AcqRel);
            if !dirty && self.engine.path().exists() {
                return None;
            }
            self.pending.store(0, Ordering::Release);
            Some(ini::serialize(&doc))
        });
        if result.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        result.map(|_| ())
    }

    /// Discard in-memory contents and load from disk again.
    ///
    /// Returns which file the contents came from.  A decryption failure
    /// on both files is returned and leaves the in-memory document
    /// untouched.
    pub fn reload(&self) -> Result<LoadSource> {
        self.ensure_active()?;
        let loaded = self.engine.load()?;
        {
            let mut doc = self.write_lock();
            *doc = loaded.document;
            self.dirty.store(false, Ordering::Release);
        }
        self.pending.store(0, Ordering::Release);
        Ok(loaded.source)
    }

    /// Save (if `save_on_dispose` and there are unsaved changes) and
    /// release the contents.  The handle cannot be used afterwards.
    pub fn dispose(&self) -> Result<()> {
        self.ensure_active()?;
        let result = if self.options.save_on_dispose {
            self.save_snapshot()
        } else {
            Ok(())
        };
        self.state.store(DISPOSED, Ordering::Release);
        self.write_lock().clear();
        result
    }

    /// Delete the primary, backup and temp files and release the
    /// contents.  The handle cannot be used afterwards.
    pub fn delete(&self) -> Result<()> {
        self.ensure_active()?;
        self.state.store(DELETED, Ordering::Release);
        self.write_lock().clear();
        self.engine.remove_files()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The passphrase the encryption key was derived from.
    ///
    /// For machine-bound stores this is the only way to open the same
    /// file elsewhere: pass it as `Encryption::Passphrase`.
    pub fn export_passphrase(&self) -> Result<Option<String>> {
        self.ensure_active()?;
        Ok(self.passphrase.as_ref().map(|p| p.as_str().to_string()))
    }

    pub fn path(&self) -> &Path {
        self.engine.path()
    }

    pub fn backup_path(&self) -> &Path {
        self.engine.backup_path()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn is_encrypted(&self) -> bool {
        self.engine.framing().is_encrypted()
    }

    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }
}

impl Drop for IniStore {
    fn drop(&mut self) {
        if self.is_active() && self.options.save_on_dispose {
            // No-op when clean.  Errors already went through the error channel.
            let _ = self.save_snapshot();
        }
    }
}

fn convert<T: IniValue>(section: &str, key: &str, raw: &str, default: T) -> T {
    T::from_ini(raw).unwrap_or_else(|| {
        debug!("[{section}] {key} = {raw:?} did not convert, using default");
        default
    })
}

// ----------------------------------------------------------------------
// Validation
// ----------------------------------------------------------------------

fn has_line_break(s: &str) -> bool {
    s.contains('\n') || s.contains('\r')
}

/// Section names must survive a write/parse cycle unchanged.
fn validate_section_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidName(
            "section name cannot be empty".into(),
        ));
    }
    if name.trim() != name {
        return Err(StoreError::InvalidName(format!(
            "section name '{name}' has leading or trailing whitespace"
        )));
    }
    if has_line_break(name) || name.contains('[') || name.contains(']') {
        return Err(StoreError::InvalidName(format!(
            "section name '{name}' contains a line break or bracket"
        )));
    }
    Ok(())
}

/// Key names must survive a write/parse cycle unchanged.
fn validate_key_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidName("key name cannot be empty".into()));
    }
    if name.trim() != name {
        return Err(StoreError::InvalidName(format!(
            "key name '{name}' has leading or trailing whitespace"
        )));
    }
    if has_line_break(name) || name.contains('=') {
        return Err(StoreError::InvalidName(format!(
            "key name '{name}' contains a line break or '='"
        )));
    }
    if name.starts_with(';') || name.starts_with('#') || name.starts_with('[') {
        return Err(StoreError::InvalidName(format!(
            "key name '{name}' would be read back as a comment or section"
        )));
    }
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    if has_line_break(value) {
        return Err(StoreError::InvalidName(format!(
            "value of '{key}' contains a line break"
        )));
    }
    Ok(())
}
