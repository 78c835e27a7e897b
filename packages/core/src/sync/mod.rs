//! Visibility Sync
//!
//! - [`diff`] - baseline-vs-draft visibility diff and the safe-clone helper
//! - [`controller`] - one sync attempt: diff, single save call, outcome
//! - [`session`] - the session-scoped store that owns the baseline tree
//!
//! # Data flow
//!
//! ```text
//! ForestSource ──normalize──▶ TreeSession (baseline)
//!                                  │ begin_draft()
//!                                  ▼
//!                         draft (edited by the UI)
//!                                  │ sync_draft()
//!                                  ▼
//!        collect_visibility_changes ──▶ VisibilitySaver (one call)
//!                                  │ Synced
//!                                  ▼
//!                       draft promoted to baseline
//! ```

pub mod controller;
pub mod diff;
pub mod error;
pub mod session;

pub use controller::{
    confirm_visibility_update, submit_visibility_changes, ErrorCallback, NoChangeCallback,
    SuccessCallback, SyncHooks, SyncOutcome, SyncPhase,
};
pub use diff::{
    collect_visibility_changes, safe_clone, to_visibility_map, DiffOptions, VisibilityEntry,
    VisibilityMap,
};
pub use error::SyncError;
pub use session::TreeSession;
