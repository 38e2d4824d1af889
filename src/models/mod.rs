//! Data models for time capsules.
//!
//! - [`Group`] - a capsule with members, an unlock date and media
//! - [`MediaItem`] - a photo or video with its own comment thread
//! - [`Comment`] - a comment, optionally carrying one level of replies
//!
//! Identifiers are UUID newtypes so group, media and comment ids cannot be
//! mixed up. Photo and video counts are always derived from the media list.

pub mod comment;
pub mod group;
pub mod ids;
pub mod media;

pub use comment::{Comment, DEFAULT_AUTHOR, NewComment};
pub use group::{Group, NewGroup};
pub use ids::{CommentId, GroupId, MediaId};
pub use media::{MediaItem, MediaKind};
