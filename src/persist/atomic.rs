//! Crash-safe file replacement.
//!
//! A save is split in two stages so that each one leaves the primary
//! file intact on failure:
//!
//! 1. `write_temp` writes the new bytes to `<path>.tmp` and fsyncs them.
//! 2. `commit` optionally captures the current primary as
//!    `<path>.backup`, then renames the temp file over the primary.
//!
//! The temp and backup files live in the same directory as the primary
//! so every rename stays on one filesystem and is atomic.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".backup")
}

/// `<path>.tmp`
pub fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, ".tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Stage `bytes` in `<path>.tmp`, flushed to disk.
///
/// The primary file is not touched.  On failure the temp file is
/// removed (best effort) and the error returned.
pub fn write_temp(path: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path(path);
    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(tmp)
}

/// Replace `path` with `tmp`.
///
/// With `backup` set and an existing primary, the primary's current
/// contents become the backup first.  The backup is staged under its
/// own temp name and renamed into place, so a crash at any point leaves
/// both the primary and the backup either old or new, never partial.
pub fn commit(tmp: &Path, path: &Path, backup: Option<&Path>) -> io::Result<()> {
    if let Some(backup) = backup {
        if path.exists() {
            capture_backup(path, backup)?;
        }
    }

    fs::rename(tmp, path)?;
    sync_parent_dir(path);
    Ok(())
}

/// Point `backup` at the current primary contents.
///
/// A hard link shares the primary's inode, which the following rename
/// detaches from the primary name without rewriting it.  Filesystems
/// without hard links get a flushed copy instead.
fn capture_backup(path: &Path, backup: &Path) -> io::Result<()> {
    let staging = temp_path(backup);
    let _ = fs::remove_file(&staging);

    if fs::hard_link(path, &staging).is_err() {
        fs::copy(path, &staging)?;
        File::open(&staging)?.sync_all()?;
    }

    fs::rename(&staging, backup)
}

/// Flush the directory entry after a rename.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

/// Remove the primary, backup and any stale temp file.
pub fn remove_all(path: &Path) -> io::Result<()> {
    for target in [
        path.to_path_buf(),
        backup_path(path),
        temp_path(path),
        temp_path(&backup_path(path)),
    ] {
        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
