//! Arbitrary stored bytes must always load to a usable document.

#![no_main]

use codexdb::storage::MemoryStore;
use codexdb::{CodexDB, Config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let store = MemoryStore::new();
    store.insert_raw("codex_v1", data);
    store.insert_raw("codex_config", data);

    let mut db = CodexDB::open_with_store(Box::new(store), Config::unlimited())
        .expect("opening over a memory store cannot fail");

    // Whatever loaded must save and reload with the same records.
    let before = db.document().record_count();
    assert!(db.persist().is_saved());
    db.reload();
    assert_eq!(db.document().record_count(), before);
});
