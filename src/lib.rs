//! Momento - shared time capsules that unlock on a future date
//!
//! A group of people collects photos, videos and comments in a capsule that
//! stays locked until its unlock date. This library provides:
//!
//! - The capsule data model (groups, media items, comment threads)
//! - An in-memory store that keeps locked and unlocked groups apart
//! - An unlock gate (date reached, or an optional passphrase)
//! - JSON snapshots for keeping the store on disk
//! - Import of group documents exported by the original mobile app
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use momento::{CapsuleStore, NewGroup, UnlockGate};
//!
//! let now = Utc::now();
//! let mut store = CapsuleStore::new();
//! let id = store.add_group(NewGroup::new("Graduation", now + Duration::days(365)).member("ana"), now)?;
//! store.add_media(id, "file:///party.mp4", None, now)?;
//!
//! assert!(store.unlock_group(id, &UnlockGate::date_only(), None, now).is_err());
//! assert_eq!(store.group(id).map(|g| g.video_count()), Some(1));
//! # Ok::<(), momento::StoreError>(())
//! ```

pub mod cli;
pub mod models;
pub mod parsers;
pub mod storage;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use models::{Comment, Group, GroupId, MediaId, MediaItem, MediaKind, NewComment, NewGroup};
pub use storage::{load_store, save_store};
pub use store::{CapsuleStore, StoreError, UnlockGate, UnlockOutcome};
