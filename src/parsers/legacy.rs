use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Deserialize;

use crate::models::group::normalize_members;
use crate::models::{Group, GroupId, MediaItem, MediaKind};
use crate::store::CapsuleStore;
use crate::utils::validate_file_size;

const MAX_CONSECUTIVE_ERRORS: usize = 100;

/// A group document as the original app stored it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyGroup {
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_legacy_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "crate::parsers::deserializers::deserialize_members")]
    pub members: Vec<String>,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_timestamp")]
    pub unlock_date: DateTime<Utc>,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default, alias = "media")]
    pub media_items: Vec<LegacyMedia>,
    /// Oldest snapshots kept bare uris here
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMedia {
    pub uri: String,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub is_video: Option<bool>,
}

impl LegacyMedia {
    pub fn kind(&self) -> MediaKind {
        if self.is_video == Some(true) {
            return MediaKind::Video;
        }
        match self.media_type.as_deref().map(str::to_lowercase).as_deref() {
            Some("video") => MediaKind::Video,
            Some("photo") | Some("image") => MediaKind::Photo,
            _ => MediaKind::from_uri(&self.uri),
        }
    }
}

impl LegacyGroup {
    /// Convert into a store group with a fresh id
    pub fn into_group(self, now: DateTime<Utc>) -> Group {
        let locked = !self.is_unlocked;
        let bare = self.photos.into_iter().map(|uri| {
            let kind = MediaKind::from_uri(&uri);
            (uri, kind)
        });
        let media = self
            .media_items
            .into_iter()
            .map(|m| {
                let kind = m.kind();
                (m.uri, kind)
            })
            .chain(bare)
            .filter(|(uri, _)| !uri.trim().is_empty())
            .map(|(uri, kind)| MediaItem::new(uri.trim().to_string(), kind, now, locked))
            .collect();

        Group {
            id: GroupId::new(),
            name: self.name.trim().to_string(),
            members: normalize_members(&self.members),
            unlock_at: self.unlock_date,
            created_at: now,
            unlocked_at: if self.is_unlocked { Some(now) } else { None },
            media,
        }
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: Vec<GroupId>,
    /// Lines that failed to parse or could not be stored
    pub skipped: usize,
}

/// Parse a JSON Lines file of legacy group documents
///
/// Malformed lines are logged and skipped. The whole file is rejected when
/// more than half of its lines fail or 100 fail in a row.
pub fn parse_legacy_file(path: &Path) -> Result<Vec<LegacyGroup>> {
    let mut groups = Vec::new();
    read_legacy_groups(path, |group| groups.push(group))?;
    Ok(groups)
}

/// Feed every parseable group in `path` to `on_group`; returns the number of skipped lines
fn read_legacy_groups(path: &Path, mut on_group: impl FnMut(LegacyGroup)) -> Result<usize> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open import file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut seen = 0usize;
    let mut skipped = 0usize;
    let mut failure_run = 0usize;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.context("Failed to read line from import file")?;
        if line.trim().is_empty() {
            continue;
        }
        seen += 1;

        let Err(e) = serde_json::from_str::<LegacyGroup>(&line).map(&mut on_group) else {
            failure_run = 0;
            continue;
        };
        warn!("Skipping line {} in {}: {}", index + 1, path.display(), e);
        skipped += 1;
        failure_run += 1;
        if failure_run >= MAX_CONSECUTIVE_ERRORS {
            bail!(
                "Too many consecutive parse errors ({}) in import file - file may be corrupted",
                failure_run
            );
        }
    }

    if seen > 0 && skipped * 2 > seen {
        bail!(
            "Too many parse failures in import file: {} of {} lines failed ({:.1}%)",
            skipped,
            seen,
            (skipped as f64) * 100.0 / (seen as f64)
        );
    }
    Ok(skipped)
}

/// Parse `path` and add every valid group to `store`
///
/// Nothing is added when the file as a whole is rejected.
pub fn import_legacy_file(
    store: &mut CapsuleStore,
    path: &Path,
    now: DateTime<Utc>,
) -> Result<ImportSummary> {
    let mut parsed = Vec::new();
    let skipped = read_legacy_groups(path, |group| parsed.push(group))?;
    let mut summary = ImportSummary { imported: Vec::with_capacity(parsed.len()), skipped };

    for legacy in parsed {
        let legacy_id = legacy.id.clone();
        let group = legacy.into_group(now);
        let id = group.id;
        match store.insert_group(group) {
            Ok(()) => summary.imported.push(id),
            Err(e) => {
                warn!("Skipping legacy group {}: {}", legacy_id, e);
                summary.skipped += 1;
            }
        }
    }

    info!(
        "Imported {} groups from {} ({} skipped)",
        summary.imported.len(),
        path.display(),
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_lines(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_media_kind_resolution() {
        let typed = LegacyMedia { uri: "x".into(), media_type: Some("video".into()), is_video: None };
        assert_eq!(typed.kind(), MediaKind::Video);

        let flagged = LegacyMedia { uri: "x.jpg".into(), media_type: None, is_video: Some(true) };
        assert_eq!(flagged.kind(), MediaKind::Video);

        let inferred = LegacyMedia { uri: "x.MP4".into(), media_type: None, is_video: None };
        assert_eq!(inferred.kind(), MediaKind::Video);

        let photo = LegacyMedia { uri: "x.mov".into(), media_type: Some("photo".into()), is_video: None };
        assert_eq!(photo.kind(), MediaKind::Photo);
    }

    #[test]
    fn test_into_group_merges_media_sources() {
        let json = r#"{"id":"1","name":" Trip ","members":["Ana","Ana"," Ben"],
            "unlockDate":"2027-01-01T00:00:00Z","photoCount":5,
            "mediaItems":[{"uri":"a.jpg","type":"photo"},{"uri":"b.mp4","type":"video"}],
            "photos":["c.png"]}"#;
        let legacy: LegacyGroup = serde_json::from_str(json).unwrap();
        let group = legacy.into_group(Utc::now());

        assert_eq!(group.name, "Trip");
        assert_eq!(group.members, vec!["Ana", "Ben"]);
        assert_eq!(group.photo_count(), 2);
        assert_eq!(group.video_count(), 1);
        assert!(group.media.iter().all(|m| m.locked));
        assert!(!group.is_unlocked());
    }

    #[test]
    fn test_media_alias() {
        let json = r#"{"id":"1","name":"x","unlockDate":0,"media":[{"uri":"a.avi"}]}"#;
        let legacy: LegacyGroup = serde_json::from_str(json).unwrap();
        assert_eq!(legacy.media_items.len(), 1);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let file = write_lines(&[
            r#"{"id":"1","name":"A","unlockDate":"2027-01-01T00:00:00Z"}"#,
            "",
            "not json",
            r#"{"id":"2","name":"B","unlockDate":1700000000000}"#,
        ]);
        let groups = parse_legacy_file(file.path()).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_parse_fails_when_mostly_garbage() {
        let file = write_lines(&[
            r#"{"id":"1","name":"A","unlockDate":0}"#,
            "garbage",
            "more garbage",
        ]);
        let err = parse_legacy_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Too many parse failures"));
    }

    #[test]
    fn test_parse_fails_on_long_run_of_bad_lines() {
        let valid = r#"{"id":"1","name":"A","unlockDate":0}"#;
        let mut lines = vec![valid; 150];
        lines.extend(std::iter::repeat_n("garbage", MAX_CONSECUTIVE_ERRORS));
        let file = write_lines(&lines);

        let err = parse_legacy_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Too many consecutive parse errors"));

        let mut store = CapsuleStore::new();
        assert!(import_legacy_file(&mut store, file.path(), Utc::now()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_places_groups_by_state() {
        let file = write_lines(&[
            r#"{"id":"1","name":"Open","unlockDate":0,"isUnlocked":true,"photos":["a.jpg"]}"#,
            r#"{"id":"2","name":"Closed","unlockDate":"2099-01-01T00:00:00Z"}"#,
            r#"{"id":"3","name":"   ","unlockDate":0}"#,
        ]);
        let mut store = CapsuleStore::new();
        let summary = import_legacy_file(&mut store, file.path(), Utc::now()).unwrap();

        assert_eq!(summary.imported.len(), 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(store.unlocked_groups().len(), 1);
        assert_eq!(store.locked_groups().len(), 1);
        assert!(store.unlocked_groups()[0].media.iter().all(|m| !m.locked));
        store.verify_invariants().unwrap();
    }

    #[test]
    fn test_import_missing_file() {
        let mut store = CapsuleStore::new();
        let result = import_legacy_file(&mut store, Path::new("/nonexistent/groups.jsonl"), Utc::now());
        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
