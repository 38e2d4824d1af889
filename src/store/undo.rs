use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GroupId, MediaId};

/// Default time a media addition stays undoable
pub const DEFAULT_UNDO_WINDOW_SECS: i64 = 10;

/// Longest undo window a store accepts (one day)
pub const MAX_UNDO_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Clamp `window` into `0..=MAX_UNDO_WINDOW_SECS`
pub fn clamp_undo_window(window: Duration) -> Duration {
    window.clamp(Duration::zero(), Duration::seconds(MAX_UNDO_WINDOW_SECS))
}

/// Handle for undoing the most recent media addition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoTicket {
    pub group_id: GroupId,
    pub media_id: MediaId,
    pub expires_at: DateTime<Utc>,
}

impl UndoTicket {
    pub fn new(group_id: GroupId, media_id: MediaId, added_at: DateTime<Utc>, window: Duration) -> Self {
        let expires_at = added_at.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { group_id, media_id, expires_at }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}
