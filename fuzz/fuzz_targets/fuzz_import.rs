//! Import must either reject a file or leave a consistent, saved state.

#![no_main]

use codexdb::storage::MemoryStore;
use codexdb::{CodexDB, Config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut db = CodexDB::open_with_store(Box::new(MemoryStore::new()), Config::unlimited())
        .expect("opening over a memory store cannot fail");
    let before = db.document().clone();

    match db.import(data) {
        Ok(commit) => {
            assert!(commit.is_saved());
            let exported = db.export().expect("export of a decoded document");
            let value: serde_json::Value =
                serde_json::from_slice(&exported).expect("export is valid JSON");
            assert!(value["data"].is_object());
        }
        Err(err) => {
            assert!(err.is_validation());
            assert_eq!(db.document(), &before);
        }
    }
});
