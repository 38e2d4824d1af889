//! Persistent store snapshots
//!
//! The whole [`CapsuleStore`](crate::store::CapsuleStore) is written as one
//! JSON document, `store.json`, inside the data directory:
//! - Linux: `~/.local/share/momento/`
//! - macOS: `~/Library/Application Support/momento/`
//! - Windows: `%APPDATA%\momento\`
//!
//! Writes go to a temp file first and are renamed into place.

pub mod snapshot;

pub use snapshot::{SNAPSHOT_FILENAME, SNAPSHOT_VERSION, Snapshot, load_store, save_store, snapshot_path};
