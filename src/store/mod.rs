//! Group/media state store.
//!
//! [`CapsuleStore`] owns the locked and unlocked group collections and all
//! mutations over them. [`UnlockGate`] decides when a locked group may open.
//! Every failure is reported as a [`StoreError`].

pub mod capsule_store;
pub mod error;
pub mod gate;
pub mod undo;

pub use capsule_store::{CapsuleStore, StoreStats, UnlockOutcome};
pub use error::{StoreError, StoreResult};
pub use gate::{UnlockGate, UnlockReason};
pub use undo::{DEFAULT_UNDO_WINDOW_SECS, MAX_UNDO_WINDOW_SECS, UndoTicket, clamp_undo_window};
