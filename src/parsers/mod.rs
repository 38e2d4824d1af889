//! Import of group documents exported by the original mobile app
//!
//! # Error Handling Strategy
//!
//! Imports degrade gracefully:
//!
//! - **Individual line failures**: malformed JSON lines are logged and skipped,
//!   so one bad document does not block the rest of the file.
//!
//! - **Catastrophic failure detection**: if more than half of the lines fail, or
//!   more than 100 fail in a row, the whole import is rejected and the store is
//!   left untouched.
//!
//! - **Error propagation**: file level problems use `anyhow::Result` with
//!   context; store level problems surface as [`StoreError`](crate::store::StoreError).

pub mod deserializers;
pub mod legacy;

pub use legacy::{ImportSummary, LegacyGroup, LegacyMedia, import_legacy_file, parse_legacy_file};
