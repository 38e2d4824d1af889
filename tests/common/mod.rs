//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use momento::storage::{save_store, snapshot_path};
use momento::store::CapsuleStore;
use tempfile::TempDir;

/// Fixed reference instant so date comparisons are deterministic
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

/// Builder for a temporary momento data directory
pub struct DataDirBuilder {
    temp_dir: TempDir,
}

impl DataDirBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Persist `store` as the directory's snapshot
    pub fn with_store(self, store: &CapsuleStore) -> Self {
        save_store(&snapshot_path(self.temp_dir.path()), store, fixed_now())
            .expect("Failed to save store");
        self
    }

    /// Write an import file made of the given legacy documents
    pub fn with_import_file(self, name: &str, groups: &[LegacyGroupBuilder]) -> Self {
        let content = groups.iter().map(|g| g.to_json()).collect::<Vec<_>>().join("\n");
        self.with_raw_file(name, &content)
    }

    pub fn with_raw_file(self, name: &str, content: &str) -> Self {
        fs::write(self.temp_dir.path().join(name), content).expect("Failed to write file");
        self
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for DataDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for group documents in the original app's shape
pub struct LegacyGroupBuilder {
    id: String,
    name: String,
    members: Vec<String>,
    unlock_date: String,
    is_unlocked: bool,
    media: Vec<(String, &'static str)>,
}

impl LegacyGroupBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Group {}", id),
            members: Vec::new(),
            unlock_date: "2099-01-01T00:00:00.000Z".to_string(),
            is_unlocked: false,
            media: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn member(mut self, member: &str) -> Self {
        self.members.push(member.to_string());
        self
    }

    pub fn unlock_date(mut self, date: &str) -> Self {
        self.unlock_date = date.to_string();
        self
    }

    pub fn unlocked(mut self) -> Self {
        self.is_unlocked = true;
        self
    }

    pub fn photo(mut self, uri: &str) -> Self {
        self.media.push((uri.to_string(), "photo"));
        self
    }

    pub fn video(mut self, uri: &str) -> Self {
        self.media.push((uri.to_string(), "video"));
        self
    }

    pub fn to_json(&self) -> String {
        let members = self.members.iter().map(|m| format!(r#""{}""#, m)).collect::<Vec<_>>();
        let media = self
            .media
            .iter()
            .map(|(uri, kind)| format!(r#"{{"uri":"{}","type":"{}"}}"#, uri, kind))
            .collect::<Vec<_>>();

        format!(
            r#"{{"id":"{}","name":"{}","members":[{}],"unlockDate":"{}","isUnlocked":{},"mediaItems":[{}]}}"#,
            self.id,
            self.name,
            members.join(","),
            self.unlock_date,
            self.is_unlocked,
            media.join(",")
        )
    }
}
