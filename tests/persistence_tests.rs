//! Integration tests for crash safety, backup recovery and encryption
//! at the store level.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use inivault::crypto::{add_checksum, StaticIdentity, CHECKSUM_LEN};
use inivault::persist::{Engine, Framing};
use inivault::{Encryption, FailureClass, IniStore, LoadSource, StoreError, StoreOptions};
use tempfile::TempDir;

fn store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("app.ini");
    (dir, path)
}

/// Default options with the cheapest KDF cost, for encrypted tests.
fn fast() -> StoreOptions {
    StoreOptions::default().with_fast_kdf()
}

fn passphrase(p: &str) -> Encryption {
    Encryption::Passphrase(p.to_string())
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypted_file_hides_plaintext() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, fast(), passphrase("pw")).unwrap();
        store.set("secrets", "api_token", "tok_live_123456").unwrap();
    }

    let raw = fs::read(&path).unwrap();
    let needle = b"tok_live_123456";
    assert!(!raw.windows(needle.len()).any(|w| w == needle));
    assert!(!raw.windows(7).any(|w| w == b"secrets"));

    let store = IniStore::open(&path, fast(), passphrase("pw")).unwrap();
    assert!(store.is_encrypted());
    assert_eq!(
        store.get("secrets", "api_token").unwrap().as_deref(),
        Some("tok_live_123456")
    );
}

#[test]
fn wrong_passphrase_fails_with_decryption_error() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, fast(), passphrase("right")).unwrap();
        store.set("s", "k", "v").unwrap();
    }
    let before = fs::read(&path).unwrap();

    let result = IniStore::open(&path, fast(), passphrase("wrong"));
    assert!(matches!(result, Err(StoreError::DecryptionFailed)));

    // A failed open never rewrites the file.
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn empty_passphrase_is_rejected() {
    let (_dir, path) = store_path();
    let result = IniStore::open(&path, fast(), passphrase(""));
    assert!(matches!(result, Err(StoreError::KeyDerivationFailed(_))));
    assert!(!path.exists());
}

#[test]
fn machine_key_passphrase_opens_store_elsewhere() {
    let (_dir, path) = store_path();
    let identity = Arc::new(StaticIdentity::new("carol", "build-01", "corp"));

    let exported = {
        let store = IniStore::open(&path, fast(), Encryption::Machine(identity)).unwrap();
        store.set("deploy", "region", "eu-west").unwrap();
        store.export_passphrase().unwrap().expect("encrypted store has a passphrase")
    };
    assert_eq!(exported, "carol@build-01.corp");

    let store = IniStore::open(&path, fast(), passphrase(&exported)).unwrap();
    assert_eq!(
        store.get("deploy", "region").unwrap().as_deref(),
        Some("eu-west")
    );
}

#[test]
fn different_machine_identity_cannot_decrypt() {
    let (_dir, path) = store_path();
    {
        let id = Arc::new(StaticIdentity::new("carol", "build-01", ""));
        let store = IniStore::open(&path, fast(), Encryption::Machine(id)).unwrap();
        store.set("s", "k", "v").unwrap();
    }

    let other = Arc::new(StaticIdentity::new("carol", "build-02", ""));
    let result = IniStore::open(&path, fast(), Encryption::Machine(other));
    assert!(matches!(result, Err(StoreError::DecryptionFailed)));
}

#[test]
fn header_text_is_written_before_the_body() {
    let (_dir, path) = store_path();
    let options = StoreOptions {
        header: Some("; generated file, do not edit".into()),
        ..fast()
    };
    {
        let store = IniStore::open(&path, options.clone(), passphrase("pw")).unwrap();
        store.set("s", "k", "v").unwrap();
    }

    let raw = fs::read(&path).unwrap();
    assert!(raw.starts_with(b"; generated file, do not edit\n"));

    let store = IniStore::open(&path, options, passphrase("pw")).unwrap();
    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("v"));
}

// ---------------------------------------------------------------------------
// Integrity and backup recovery
// ---------------------------------------------------------------------------

#[test]
fn flipped_byte_recovers_from_backup_and_reports_once() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
        store.set("s", "k", "1").unwrap();
        store.set("s", "k", "2").unwrap();
    }

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    let seen: Arc<Mutex<Vec<FailureClass>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let store = IniStore::builder(&path)
        .on_error(move |e| sink.lock().unwrap().push(e.class()))
        .open()
        .unwrap();

    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("1"));
    assert_eq!(*seen.lock().unwrap(), vec![FailureClass::Integrity]);
}

#[test]
fn encrypted_store_recovers_from_backup() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, fast(), passphrase("pw")).unwrap();
        store.set("s", "k", "1").unwrap();
        store.set("s", "k", "2").unwrap();
    }

    let mut bytes = fs::read(&path).unwrap();
    bytes[20] ^= 0x80;
    fs::write(&path, &bytes).unwrap();

    let store = IniStore::open(&path, fast(), passphrase("pw")).unwrap();
    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("1"));
}

#[test]
fn both_files_unreadable_yields_empty_store() {
    let (_dir, path) = store_path();
    fs::write(&path, b"not a valid file with a checksum trailer....").unwrap();
    fs::write(inivault::persist::backup_path(&path), b"also broken......................").unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let store = IniStore::builder(&path)
        .on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .open()
        .unwrap();

    assert!(store.sections().unwrap().is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn checksum_disabled_accepts_hand_edits() {
    let (_dir, path) = store_path();
    let options = StoreOptions {
        checksum: false,
        ..StoreOptions::default()
    };
    {
        let store = IniStore::open(&path, options.clone(), Encryption::None).unwrap();
        store.set("s", "k", "v").unwrap();
    }

    let text = fs::read_to_string(&path).unwrap().replace("k = v", "k = edited");
    fs::write(&path, text).unwrap();

    let store = IniStore::open(&path, options, Encryption::None).unwrap();
    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("edited"));
}

#[test]
fn reload_reports_backup_source() {
    let (_dir, path) = store_path();
    let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
    store.set("s", "k", "1").unwrap();
    store.set("s", "k", "2").unwrap();

    fs::write(&path, b"truncated").unwrap();

    assert_eq!(store.reload().unwrap(), LoadSource::Backup);
    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("1"));
}

// ---------------------------------------------------------------------------
// Atomic replace
// ---------------------------------------------------------------------------

#[test]
fn interrupted_save_leaves_primary_intact() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
        store.set("s", "k", "committed").unwrap();
    }
    let before = fs::read(&path).unwrap();

    // Stage a newer version without committing it, as if the process
    // died between the temp write and the rename.
    let engine = Engine::new(&path, Framing::new(None, None, true), true);
    let tmp = engine.stage(b"[s]\nk = uncommitted\n\n").unwrap();
    assert!(tmp.exists());
    assert_eq!(fs::read(&path).unwrap(), before);

    let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("committed"));
}

#[test]
fn save_keeps_previous_version_as_backup() {
    let (_dir, path) = store_path();
    let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
    store.set("s", "k", "1").unwrap();
    let first = fs::read(&path).unwrap();

    store.set("s", "k", "2").unwrap();

    assert_eq!(fs::read(store.backup_path()).unwrap(), first);
    assert!(!inivault::persist::temp_path(&path).exists());
}

#[test]
fn closing_a_saved_store_keeps_previous_version_in_backup() {
    let (_dir, path) = store_path();
    let backup = inivault::persist::backup_path(&path);
    {
        let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
        store.set("s", "k", "1").unwrap();
        store.set("s", "k", "2").unwrap();
    }
    let after_drop = fs::read(&backup).unwrap();
    assert!(String::from_utf8_lossy(&after_drop).contains("k = 1"));

    let store = IniStore::open(&path, StoreOptions::default(), Encryption::None).unwrap();
    store.dispose().unwrap();
    assert_eq!(fs::read(&backup).unwrap(), after_drop);
}

#[test]
fn undecryptable_primary_recovers_from_backup() {
    let (_dir, path) = store_path();
    {
        let store = IniStore::open(&path, fast(), passphrase("pw")).unwrap();
        store.set("s", "k", "1").unwrap();
        store.set("s", "k", "2").unwrap();
    }
    reseal_with_broken_ciphertext(&path);

    let seen: Arc<Mutex<Vec<FailureClass>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let store = IniStore::builder(&path)
        .options(fast())
        .encryption(passphrase("pw"))
        .on_error(move |e| sink.lock().unwrap().push(e.class()))
        .open()
        .unwrap();

    assert_eq!(store.get("s", "k").unwrap().as_deref(), Some("1"));
    assert_eq!(*seen.lock().unwrap(), vec![FailureClass::Cryptographic]);
}

#[test]
fn undecryptable_primary_without_backup_fails() {
    let (_dir, path) = store_path();
    let options = StoreOptions {
        autobackup: false,
        ..fast()
    };
    {
        let store = IniStore::open(&path, options.clone(), passphrase("pw")).unwrap();
        store.set("s", "k", "1").unwrap();
    }
    reseal_with_broken_ciphertext(&path);

    let result = IniStore::open(&path, options, passphrase("pw"));
    assert!(matches!(result, Err(StoreError::DecryptionFailed)));
}

/// Flip the last ciphertext byte and recompute the trailer, leaving a
/// file that passes the checksum but fails authentication.
fn reseal_with_broken_ciphertext(path: &PathBuf) {
    let bytes = fs::read(path).unwrap();
    let mut body = bytes[..bytes.len() - CHECKSUM_LEN].to_vec();
    let last = body.len() - 1;
    body[last] ^= 0x01;
    fs::write(path, add_checksum(body, true)).unwrap();
}

#[test]
fn autobackup_off_writes_no_backup() {
    let (_dir, path) = store_path();
    let options = StoreOptions {
        autobackup: false,
        ..StoreOptions::default()
    };
    let store = IniStore::open(&path, options, Encryption::None).unwrap();
    store.set("s", "k", "1").unwrap();
    store.set("s", "k", "2").unwrap();

    assert!(!store.backup_path().exists());
}
