//! Snapshot persistence: load/save with atomic writes

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::Group;
use crate::store::{CapsuleStore, UndoTicket};

/// Snapshot schema version, bumped on incompatible format changes
pub const SNAPSHOT_VERSION: u32 = 1;

pub const SNAPSHOT_FILENAME: &str = "store.json";

/// On-disk form of a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub locked: Vec<Group>,
    pub unlocked: Vec<Group>,
    #[serde(default)]
    pub pending_undo: Option<UndoTicket>,
}

impl Snapshot {
    pub fn capture(store: &CapsuleStore, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            locked: store.locked_groups().to_vec(),
            unlocked: store.unlocked_groups().to_vec(),
            pending_undo: store.pending_undo().copied(),
        }
    }

    pub fn into_store(self) -> Result<CapsuleStore> {
        CapsuleStore::from_parts(self.locked, self.unlocked, self.pending_undo)
            .context("Snapshot failed consistency checks")
    }
}

/// Path of the snapshot file inside `data_dir`
pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILENAME)
}

/// Load a store from `path`
/// Returns None if the file does not exist yet
pub fn load_store(path: &Path) -> Result<Option<CapsuleStore>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;

    // Refuse rather than drop user data written by another format version
    if snapshot.version != SNAPSHOT_VERSION {
        bail!(
            "Unsupported snapshot version in {} (expected {}, found {})",
            path.display(),
            SNAPSHOT_VERSION,
            snapshot.version
        );
    }

    debug!(
        "Loaded snapshot from {} ({} locked, {} unlocked)",
        path.display(),
        snapshot.locked.len(),
        snapshot.unlocked.len()
    );
    snapshot.into_store().map(Some)
}

/// Save `store` to `path` atomically (temp file + rename)
pub fn save_store(path: &Path, store: &CapsuleStore, now: DateTime<Utc>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create data directory")?;
    }

    let snapshot = Snapshot::capture(store, now);
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, json).context("Failed to write snapshot temp file")?;
    fs::rename(&temp_path, path).context("Failed to rename snapshot temp file")?;

    debug!("Saved snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{NewComment, NewGroup};
    use crate::store::UnlockGate;

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let result = load_store(&snapshot_path(dir.path())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_save_then_load_preserves_store() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir.path().join("nested"));
        let now = Utc::now();

        let mut store = CapsuleStore::new();
        let locked = store.add_group(NewGroup::new("Later", now + Duration::days(3)), now).unwrap();
        let opened = store.add_group(NewGroup::new("Now", now), now).unwrap();
        let media = store.add_media(locked, "a.jpg", None, now).unwrap().media_id;
        store.add_comment(locked, media, NewComment::anonymous("hi"), None, now).unwrap();
        store.unlock_group(opened, &UnlockGate::date_only(), None, now).unwrap();

        save_store(&path, &store, now).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("store.json.tmp").exists());

        let loaded = load_store(&path).unwrap().unwrap();
        assert_eq!(loaded.locked_groups(), store.locked_groups());
        assert_eq!(loaded.unlocked_groups(), store.unlocked_groups());
        assert_eq!(loaded.pending_undo(), store.pending_undo());
    }

    #[test]
    fn test_version_mismatch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(dir.path());
        let json = r#"{"version":99,"saved_at":"2026-01-01T00:00:00Z","locked":[],"unlocked":[]}"#;
        fs::write(&path, json).unwrap();

        let err = load_store(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported snapshot version"));
    }

    #[test]
    fn test_corrupted_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(dir.path());
        fs::write(&path, "{not json").unwrap();
        assert!(load_store(&path).is_err());
    }
}
