use chrono::{DateTime, Utc};

use crate::models::{CommentId, GroupId, MediaId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Media {media} not found in group {group}")]
    MediaNotFound { group: GroupId, media: MediaId },

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("No {kind} matches id prefix '{prefix}'")]
    UnknownPrefix { kind: &'static str, prefix: String },

    #[error("{kind} id prefix '{prefix}' is ambiguous ({matches} matches)")]
    AmbiguousPrefix { kind: &'static str, prefix: String, matches: usize },

    #[error("Group already exists: {0}")]
    DuplicateGroup(GroupId),

    #[error("Group name cannot be empty")]
    EmptyGroupName,

    #[error("Media uri cannot be empty")]
    EmptyMediaUri,

    #[error("Comment text cannot be empty")]
    EmptyComment,

    #[error("Cannot reply to reply {0}: only one level of replies is allowed")]
    NestedReply(CommentId),

    #[error("Group is locked until {unlock_at}")]
    NotYetDue { unlock_at: DateTime<Utc> },

    #[error("Wrong passphrase")]
    WrongPassphrase,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Undo window closed at {expired_at}")]
    UndoExpired { expired_at: DateTime<Utc> },

    #[error("Store is inconsistent: {0}")]
    Inconsistent(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
