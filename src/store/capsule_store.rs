//! In-memory state container for groups, their media and comments.
//!
//! Groups live in exactly one of two collections: locked (current) or
//! unlocked. Every operation addresses groups by id in whichever collection
//! holds them and reports unknown ids as errors instead of doing nothing.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use super::error::{StoreError, StoreResult};
use super::gate::{UnlockGate, UnlockReason};
use super::undo::{DEFAULT_UNDO_WINDOW_SECS, UndoTicket, clamp_undo_window};
use crate::models::group::normalize_members;
use crate::models::{
    Comment, CommentId, DEFAULT_AUTHOR, Group, GroupId, MediaId, MediaItem, MediaKind, NewComment,
    NewGroup,
};

/// Result of an unlock request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked(UnlockReason),
    AlreadyUnlocked,
}

/// Aggregate counts across the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub locked_groups: usize,
    pub unlocked_groups: usize,
    pub photos: usize,
    pub videos: usize,
    pub comments: usize,
}

#[derive(Debug, Clone)]
pub struct CapsuleStore {
    locked: Vec<Group>,
    unlocked: Vec<Group>,
    pending_undo: Option<UndoTicket>,
    undo_window: Duration,
}

impl Default for CapsuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CapsuleStore {
    pub fn new() -> Self {
        Self::with_undo_window(Duration::seconds(DEFAULT_UNDO_WINDOW_SECS))
    }

    /// Store whose media additions stay undoable for `undo_window`, clamped to one day
    pub fn with_undo_window(undo_window: Duration) -> Self {
        Self {
            locked: Vec::new(),
            unlocked: Vec::new(),
            pending_undo: None,
            undo_window: clamp_undo_window(undo_window),
        }
    }

    /// Rebuild a store from persisted collections, rejecting inconsistent data
    pub fn from_parts(
        locked: Vec<Group>,
        unlocked: Vec<Group>,
        pending_undo: Option<UndoTicket>,
    ) -> StoreResult<Self> {
        let store = Self { locked, unlocked, pending_undo, ..Self::new() };
        store.verify_invariants()?;
        Ok(store)
    }

    pub fn set_undo_window(&mut self, undo_window: Duration) {
        self.undo_window = clamp_undo_window(undo_window);
    }

    pub fn undo_window(&self) -> Duration {
        self.undo_window
    }

    pub fn locked_groups(&self) -> &[Group] {
        &self.locked
    }

    pub fn unlocked_groups(&self) -> &[Group] {
        &self.unlocked
    }

    /// All groups, locked first
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.locked.iter().chain(self.unlocked.iter())
    }

    pub fn pending_undo(&self) -> Option<&UndoTicket> {
        self.pending_undo.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.locked.is_empty() && self.unlocked.is_empty()
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups().find(|g| g.id == group_id)
    }

    fn group_mut(&mut self, group_id: GroupId) -> StoreResult<&mut Group> {
        self.locked
            .iter_mut()
            .chain(self.unlocked.iter_mut())
            .find(|g| g.id == group_id)
            .ok_or(StoreError::GroupNotFound(group_id))
    }

    /// Create a new locked group and return its id
    pub fn add_group(&mut self, new_group: NewGroup, now: DateTime<Utc>) -> StoreResult<GroupId> {
        let name = new_group.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyGroupName);
        }

        let members = normalize_members(&new_group.members);

        let media = new_group
            .initial_media
            .iter()
            .map(|uri| uri.trim())
            .filter(|uri| !uri.is_empty())
            .map(|uri| MediaItem::new(uri.to_string(), MediaKind::from_uri(uri), now, true))
            .collect();

        let group = Group {
            id: GroupId::new(),
            name: name.to_string(),
            members,
            unlock_at: new_group.unlock_at,
            created_at: now,
            unlocked_at: None,
            media,
        };
        let id = group.id;

        debug!("Created group {} ({}) unlocking at {}", id, group.name, group.unlock_at);
        self.locked.push(group);
        Ok(id)
    }

    /// Insert a fully built group, placing it by its unlock state
    pub fn insert_group(&mut self, mut group: Group) -> StoreResult<()> {
        if group.name.trim().is_empty() {
            return Err(StoreError::EmptyGroupName);
        }
        if self.group(group.id).is_some() {
            return Err(StoreError::DuplicateGroup(group.id));
        }

        let locked = !group.is_unlocked();
        for item in &mut group.media {
            item.locked = locked;
        }

        debug!("Inserted group {} ({})", group.id, group.name);
        if locked {
            self.locked.push(group);
        } else {
            self.unlocked.push(group);
        }
        Ok(())
    }

    /// Attach a photo or video to a group
    ///
    /// When `kind` is `None` it is inferred from the uri. The returned ticket
    /// allows undoing this addition until the undo window closes.
    pub fn add_media(
        &mut self,
        group_id: GroupId,
        uri: &str,
        kind: Option<MediaKind>,
        now: DateTime<Utc>,
    ) -> StoreResult<UndoTicket> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(StoreError::EmptyMediaUri);
        }

        let undo_window = self.undo_window;
        let group = self.group_mut(group_id)?;
        let kind = kind.unwrap_or_else(|| MediaKind::from_uri(uri));
        let item = MediaItem::new(uri.to_string(), kind, now, !group.is_unlocked());
        let ticket = UndoTicket::new(group_id, item.id, now, undo_window);

        debug!("Added {} {} to group {}", kind, item.id, group_id);
        group.media.push(item);
        self.pending_undo = Some(ticket);
        Ok(ticket)
    }

    pub fn remove_media(&mut self, group_id: GroupId, media_id: MediaId) -> StoreResult<MediaItem> {
        let group = self.group_mut(group_id)?;
        let position = group
            .media
            .iter()
            .position(|m| m.id == media_id)
            .ok_or(StoreError::MediaNotFound { group: group_id, media: media_id })?;
        let removed = group.media.remove(position);

        if self.pending_undo.is_some_and(|t| t.media_id == media_id) {
            self.pending_undo = None;
        }

        debug!("Removed media {} from group {}", media_id, group_id);
        Ok(removed)
    }

    /// Undo the most recent media addition if its window is still open
    ///
    /// The pending ticket is consumed either way, so after `UndoExpired` a
    /// second call reports `NothingToUndo`.
    pub fn undo_last_media(&mut self, now: DateTime<Utc>) -> StoreResult<MediaItem> {
        let ticket = self.pending_undo.take().ok_or(StoreError::NothingToUndo)?;
        if !ticket.is_open(now) {
            return Err(StoreError::UndoExpired { expired_at: ticket.expires_at });
        }
        self.remove_media(ticket.group_id, ticket.media_id)
    }

    /// Post a comment on a media item, or a reply when `parent` is given
    pub fn add_comment(
        &mut self,
        group_id: GroupId,
        media_id: MediaId,
        comment: NewComment,
        parent: Option<CommentId>,
        now: DateTime<Utc>,
    ) -> StoreResult<CommentId> {
        let text = comment.text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyComment);
        }
        let author = match comment.author.trim() {
            "" => DEFAULT_AUTHOR,
            author => author,
        };

        let group = self.group_mut(group_id)?;
        let item = group
            .media_item_mut(media_id)
            .ok_or(StoreError::MediaNotFound { group: group_id, media: media_id })?;
        let new_comment = Comment::new(text.to_string(), author.to_string(), now);
        let id = new_comment.id;

        match parent {
            None => item.comments.push(new_comment),
            Some(parent_id) => {
                if let Some(thread) = item.comments.iter_mut().find(|c| c.id == parent_id) {
                    thread.replies.push(new_comment);
                } else if item.comments.iter().flat_map(|c| &c.replies).any(|r| r.id == parent_id)
                {
                    return Err(StoreError::NestedReply(parent_id));
                } else {
                    return Err(StoreError::CommentNotFound(parent_id));
                }
            }
        }

        debug!("Added comment {} on media {} in group {}", id, media_id, group_id);
        Ok(id)
    }

    /// Move a group to the unlocked collection if the gate allows it
    ///
    /// Unlocking an already unlocked group is a no-op that reports
    /// [`UnlockOutcome::AlreadyUnlocked`].
    pub fn unlock_group(
        &mut self,
        group_id: GroupId,
        gate: &UnlockGate,
        attempt: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<UnlockOutcome> {
        if self.unlocked.iter().any(|g| g.id == group_id) {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let index = self
            .locked
            .iter()
            .position(|g| g.id == group_id)
            .ok_or(StoreError::GroupNotFound(group_id))?;
        let reason = gate.authorize(&self.locked[index], attempt, now)?;

        let group = self.locked.remove(index);
        self.push_unlocked(group, now);
        info!("Unlocked group {} ({:?})", group_id, reason);
        Ok(UnlockOutcome::Unlocked(reason))
    }

    /// Unlock every locked group whose unlock date has been reached
    pub fn unlock_due(&mut self, now: DateTime<Utc>) -> Vec<GroupId> {
        let (due, still_locked): (Vec<Group>, Vec<Group>) =
            std::mem::take(&mut self.locked).into_iter().partition(|g| g.is_due(now));
        self.locked = still_locked;

        let mut unlocked_ids = Vec::with_capacity(due.len());
        for group in due {
            info!("Unlocked group {} (unlock date {} reached)", group.id, group.unlock_at);
            unlocked_ids.push(group.id);
            self.push_unlocked(group, now);
        }
        unlocked_ids
    }

    fn push_unlocked(&mut self, mut group: Group, now: DateTime<Utc>) {
        group.unlocked_at = Some(now);
        for item in &mut group.media {
            item.locked = false;
        }
        self.unlocked.push(group);
    }

    /// Find the group whose id starts with `prefix`
    pub fn resolve_group(&self, prefix: &str) -> StoreResult<GroupId> {
        resolve_prefix("group", prefix, self.groups().map(|g| g.id), |id, p| id.matches_prefix(p))
    }

    /// Find the media item of `group_id` whose id starts with `prefix`
    pub fn resolve_media(&self, group_id: GroupId, prefix: &str) -> StoreResult<MediaId> {
        let group = self.group(group_id).ok_or(StoreError::GroupNotFound(group_id))?;
        resolve_prefix("media", prefix, group.media.iter().map(|m| m.id), |id, p| {
            id.matches_prefix(p)
        })
    }

    /// Find a comment or reply on a media item whose id starts with `prefix`
    pub fn resolve_comment(
        &self,
        group_id: GroupId,
        media_id: MediaId,
        prefix: &str,
    ) -> StoreResult<CommentId> {
        let group = self.group(group_id).ok_or(StoreError::GroupNotFound(group_id))?;
        let item = group
            .media_item(media_id)
            .ok_or(StoreError::MediaNotFound { group: group_id, media: media_id })?;
        let ids = item.comments.iter().flat_map(|c| std::iter::once(c).chain(&c.replies)).map(|c| c.id);
        resolve_prefix("comment", prefix, ids, |id, p| id.matches_prefix(p))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            locked_groups: self.locked.len(),
            unlocked_groups: self.unlocked.len(),
            photos: self.groups().map(Group::photo_count).sum(),
            videos: self.groups().map(Group::video_count).sum(),
            comments: self.groups().map(Group::comment_count).sum(),
        }
    }

    /// Check the structural invariants of the store
    pub fn verify_invariants(&self) -> StoreResult<()> {
        let mut seen = HashSet::new();
        for group in self.groups() {
            if !seen.insert(group.id) {
                return Err(StoreError::Inconsistent(format!(
                    "group {} appears more than once",
                    group.id
                )));
            }
        }

        for group in &self.locked {
            if group.is_unlocked() {
                return Err(StoreError::Inconsistent(format!(
                    "group {} is in the locked collection but marked unlocked",
                    group.id
                )));
            }
        }

        for group in &self.unlocked {
            if !group.is_unlocked() {
                return Err(StoreError::Inconsistent(format!(
                    "group {} is in the unlocked collection but not marked unlocked",
                    group.id
                )));
            }
            if let Some(item) = group.media.iter().find(|m| m.locked) {
                return Err(StoreError::Inconsistent(format!(
                    "media {} of unlocked group {} is still locked",
                    item.id, group.id
                )));
            }
        }

        for group in self.groups() {
            for item in &group.media {
                if item.comments.iter().flat_map(|c| &c.replies).any(|r| !r.replies.is_empty()) {
                    return Err(StoreError::Inconsistent(format!(
                        "media {} has replies nested more than one level",
                        item.id
                    )));
                }
            }
        }

        Ok(())
    }
}

fn resolve_prefix<T: Copy>(
    kind: &'static str,
    prefix: &str,
    ids: impl Iterator<Item = T>,
    matches: impl Fn(&T, &str) -> bool,
) -> StoreResult<T> {
    let prefix = prefix.trim();
    let found: Vec<T> = ids.filter(|id| matches(id, prefix)).collect();
    match found.as_slice() {
        [id] => Ok(*id),
        [] => Err(StoreError::UnknownPrefix { kind, prefix: prefix.to_string() }),
        _ => Err(StoreError::AmbiguousPrefix { kind, prefix: prefix.to_string(), matches: found.len() }),
    }
}
