use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{GroupId, MediaId};
use super::media::MediaItem;

/// A shared capsule: members, an unlock date, and the media collected so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<String>,
    pub unlock_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Set when the group moved to the unlocked collection
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

impl Group {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Whether the scheduled unlock date has been reached at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.unlock_at <= now
    }

    pub fn photo_count(&self) -> usize {
        self.media.len() - self.video_count()
    }

    pub fn video_count(&self) -> usize {
        self.media.iter().filter(|m| m.is_video()).count()
    }

    pub fn comment_count(&self) -> usize {
        self.media.iter().map(MediaItem::comment_count).sum()
    }

    pub fn media_item(&self, media_id: MediaId) -> Option<&MediaItem> {
        self.media.iter().find(|m| m.id == media_id)
    }

    pub(crate) fn media_item_mut(&mut self, media_id: MediaId) -> Option<&mut MediaItem> {
        self.media.iter_mut().find(|m| m.id == media_id)
    }
}

/// Input for creating a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub members: Vec<String>,
    pub unlock_at: DateTime<Utc>,
    /// Media handles picked while creating the group
    pub initial_media: Vec<String>,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, unlock_at: DateTime<Utc>) -> Self {
        Self { name: name.into(), members: Vec::new(), unlock_at, initial_media: Vec::new() }
    }

    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn media(mut self, uri: impl Into<String>) -> Self {
        self.initial_media.push(uri.into());
        self
    }
}

/// Trim member names, dropping blanks and repeats while keeping order
pub(crate) fn normalize_members<'a>(members: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for member in members {
        let member = member.trim();
        if !member.is_empty() && !normalized.iter().any(|m| m == member) {
            normalized.push(member.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::MediaKind;

    fn sample_group(now: DateTime<Utc>) -> Group {
        Group {
            id: GroupId::new(),
            name: "Summer".to_string(),
            members: vec!["ana@example.com".to_string()],
            unlock_at: now + Duration::days(30),
            created_at: now,
            unlocked_at: None,
            media: vec![
                MediaItem::new("a.jpg".to_string(), MediaKind::Photo, now, true),
                MediaItem::new("b.mp4".to_string(), MediaKind::Video, now, true),
                MediaItem::new("c.png".to_string(), MediaKind::Photo, now, true),
            ],
        }
    }

    #[test]
    fn test_counts_are_derived_from_media() {
        let group = sample_group(Utc::now());
        assert_eq!(group.photo_count(), 2);
        assert_eq!(group.video_count(), 1);
    }

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        let group = sample_group(now);
        assert!(!group.is_due(now));
        assert!(group.is_due(now + Duration::days(30)));
        assert!(group.is_due(now + Duration::days(31)));
    }

    #[test]
    fn test_normalize_members() {
        let raw = vec![" Ana ".to_string(), String::new(), "Ben".to_string(), "Ana".to_string()];
        assert_eq!(normalize_members(&raw), vec!["Ana", "Ben"]);
    }

    #[test]
    fn test_new_group_builder() {
        let now = Utc::now();
        let new_group = NewGroup::new("Trip", now).member("Ana").member("Ben").media("x.jpg");
        assert_eq!(new_group.members, vec!["Ana", "Ben"]);
        assert_eq!(new_group.initial_media, vec!["x.jpg"]);
    }
}
