//! Unlock gate: decides whether a locked group may be opened.

use chrono::{DateTime, Utc};

use super::error::{StoreError, StoreResult};
use crate::models::Group;

/// Why a group was allowed to unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockReason {
    /// The unlock date was reached
    Scheduled,
    /// Opened early with the configured passphrase
    Passphrase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockGate {
    passphrase: Option<String>,
}

impl UnlockGate {
    /// Gate that only opens once the unlock date is reached
    pub fn date_only() -> Self {
        Self { passphrase: None }
    }

    /// Gate that also accepts `passphrase` before the unlock date
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self { passphrase: Some(passphrase.into()) }
    }

    pub fn has_passphrase(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Check whether `group` may be unlocked at `now`
    ///
    /// The date check wins: once due, any attempt (or none) is accepted.
    /// Before the date, only an exact match of the configured passphrase opens
    /// the group.
    pub fn authorize(
        &self,
        group: &Group,
        attempt: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<UnlockReason> {
        if group.is_due(now) {
            return Ok(UnlockReason::Scheduled);
        }

        match (self.passphrase.as_deref(), attempt) {
            (Some(expected), Some(given)) if expected == given => Ok(UnlockReason::Passphrase),
            (Some(_), Some(_)) => Err(StoreError::WrongPassphrase),
            _ => Err(StoreError::NotYetDue { unlock_at: group.unlock_at }),
        }
    }
}
