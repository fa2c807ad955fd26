//! Integration tests for sharing one `IniStore` between threads.

use std::sync::{Arc, Barrier};
use std::thread;

use inivault::{Encryption, IniStore, StoreOptions};
use tempfile::TempDir;

fn shared_store(options: StoreOptions) -> (TempDir, Arc<IniStore>) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("shared.ini");
    let store = IniStore::open(&path, options, Encryption::None).expect("open store");
    (dir, Arc::new(store))
}

#[test]
fn readers_hold_the_lock_at_the_same_time() {
    let (_dir, store) = shared_store(StoreOptions::default());
    store.set("s", "k", "v").unwrap();

    // Both readers must be inside `read` before either can leave it.
    // With an exclusive lock this would deadlock.
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                store
                    .read(|doc| {
                        barrier.wait();
                        doc.get("s", "k").map(str::to_string)
                    })
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("v"));
    }
}

#[test]
fn racing_autocreate_inserts_once() {
    let options = StoreOptions {
        autocreate: true,
        ..StoreOptions::default()
    };

    for _ in 0..20 {
        let (_dir, store) = shared_store(options.clone());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|default| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store
                        .get_value("race", "winner", default.to_string())
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let stored = store.get("race", "winner").unwrap().expect("value was created");

        assert_eq!(results[0], stored);
        assert_eq!(results[1], stored);
        assert_eq!(store.keys("race").unwrap().len(), 1);
    }
}

#[test]
fn concurrent_writers_lose_no_updates() {
    let options = StoreOptions {
        autosave_interval: 25,
        ..StoreOptions::default()
    };
    let (dir, store) = shared_store(options.clone());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    store
                        .set(&format!("thread{t}"), &format!("key{i}"), &i.to_string())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    store.save().unwrap();
    assert_eq!(store.sections().unwrap().len(), 8);

    let path = store.path().to_path_buf();
    drop(store);
    let reopened = IniStore::open(&path, options, Encryption::None).unwrap();
    for t in 0..8 {
        let section = format!("thread{t}");
        assert_eq!(reopened.keys(&section).unwrap().len(), 50);
        assert_eq!(reopened.get_value(&section, "key49", 0u32).unwrap(), 49);
    }
    drop(dir);
}

#[test]
fn readers_and_writers_interleave() {
    let (_dir, store) = shared_store(StoreOptions {
        autosave: false,
        save_on_dispose: false,
        ..StoreOptions::default()
    });
    store.set("counter", "value", "0").unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 1..=200u32 {
                store.set_value("counter", "value", &i).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut last = 0u32;
                for _ in 0..200 {
                    let seen = store.get_value("counter", "value", 0u32).unwrap();
                    // A single writer only moves the value forward.
                    assert!(seen >= last);
                    last = seen;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.get_value("counter", "value", 0u32).unwrap(), 200);
}
