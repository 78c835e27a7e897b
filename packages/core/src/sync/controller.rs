//! Visibility sync controller
//!
//! One sync attempt moves through
//! `Idle → Diffing → (NoChange | Saving) → (Synced | Failed)`.
//!
//! The controller never touches the baseline. On `Synced` the caller (usually
//! [`crate::sync::TreeSession`]) promotes the draft; on failure the baseline
//! is left as it was, so a retry is just another call with the same inputs.

use crate::backend::VisibilitySaver;
use crate::models::{ChangeRecord, TreeNode};
use crate::sync::{collect_visibility_changes, DiffOptions, SyncError};
use crate::tree::TreeRef;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Invoked when the diff is empty and no save call is made
pub type NoChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Invoked with the backend acknowledgement and the number of changes saved
pub type SuccessCallback = Arc<dyn Fn(&str, usize) + Send + Sync>;

/// Invoked with the failure before it is returned to the caller
pub type ErrorCallback = Arc<dyn Fn(&SyncError) + Send + Sync>;

/// Optional observers of a sync attempt
#[derive(Clone, Default)]
pub struct SyncHooks {
    pub on_no_change: Option<NoChangeCallback>,
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SyncHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_no_change(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_no_change = Some(Arc::new(callback));
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&str, usize) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&SyncError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

/// Phase of the most recent sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Diffing,
    Saving,
    NoChange,
    Synced,
    Failed,
}

/// Terminal success states of a sync attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Draft matched the baseline; nothing was sent
    NoChange,
    /// The whole change set was accepted in one save call
    Synced { count: usize, message: String },
}

impl SyncOutcome {
    /// Number of change records sent to the backend
    pub fn count(&self) -> usize {
        match self {
            SyncOutcome::NoChange => 0,
            SyncOutcome::Synced { count, .. } => *count,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        match self {
            SyncOutcome::NoChange => SyncPhase::NoChange,
            SyncOutcome::Synced { .. } => SyncPhase::Synced,
        }
    }
}

/// Send an already computed change set.
///
/// An empty set short-circuits to [`SyncOutcome::NoChange`] without calling
/// `saver`. Otherwise `saver` is called exactly once with every record.
pub async fn submit_visibility_changes(
    changes: Vec<ChangeRecord>,
    saver: &dyn VisibilitySaver,
    hooks: &SyncHooks,
) -> Result<SyncOutcome, SyncError> {
    if changes.is_empty() {
        info!("No visibility changes to save");
        if let Some(callback) = &hooks.on_no_change {
            callback();
        }
        return Ok(SyncOutcome::NoChange);
    }

    let count = changes.len();
    match saver.save_visibility(&changes).await {
        Ok(message) => {
            info!("Saved {} visibility changes", count);
            if let Some(callback) = &hooks.on_success {
                callback(&message, count);
            }
            Ok(SyncOutcome::Synced { count, message })
        }
        Err(e) => {
            let error = SyncError::Save(e);
            warn!("Visibility save failed: {}", error);
            if let Some(callback) = &hooks.on_error {
                callback(&error);
            }
            Err(error)
        }
    }
}

/// Diff `draft` against `baseline` and send the result through `saver`.
#[instrument(skip_all, fields(draft_roots = draft.len()))]
pub async fn confirm_visibility_update<'a>(
    baseline: impl Into<TreeRef<'a>>,
    draft: &[TreeNode],
    saver: &dyn VisibilitySaver,
    options: DiffOptions,
    hooks: &SyncHooks,
) -> Result<SyncOutcome, SyncError> {
    let changes = collect_visibility_changes(baseline, draft, options);
    submit_visibility_changes(changes, saver, hooks).await
}
