use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CommentId;

/// Author name used when a comment is posted without one
pub const DEFAULT_AUTHOR: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// Replies to this comment. Replies themselves never have replies.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(text: String, author: String, created_at: DateTime<Utc>) -> Self {
        Self { id: CommentId::new(), text, author, created_at, replies: Vec::new() }
    }

    /// Number of comments in this thread, counting the comment itself
    pub fn thread_len(&self) -> usize {
        1 + self.replies.len()
    }
}

/// Input for posting a comment or a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub text: String,
    pub author: String,
}

impl NewComment {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self { text: text.into(), author: author.into() }
    }

    /// Comment posted under the default author name
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self::new(text, DEFAULT_AUTHOR)
    }
}
