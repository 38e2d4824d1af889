use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::ids::MediaId;

const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".mov", ".avi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Guess the kind from the asset handle's extension (case-insensitive)
    pub fn from_uri(uri: &str) -> Self {
        let lower = uri.to_lowercase();
        if VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => f.write_str("photo"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    /// Opaque handle to a local or remote asset
    pub uri: String,
    pub kind: MediaKind,
    pub added_at: DateTime<Utc>,
    /// Lock state of the owning group when the item was added; cleared on unlock
    pub locked: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl MediaItem {
    pub fn new(uri: String, kind: MediaKind, added_at: DateTime<Utc>, locked: bool) -> Self {
        Self { id: MediaId::new(), uri, kind, added_at, locked, comments: Vec::new() }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Comments plus all their replies
    pub fn comment_count(&self) -> usize {
        self.comments.iter().map(Comment::thread_len).sum()
    }
}
