//! Session-scoped tree store
//!
//! [`TreeSession`] is the explicit context object that owns the baseline
//! forest for one user session. It is created at session start, handed the
//! [`ForestSource`] it loads from, and dropped at session end.
//!
//! # Baseline lifecycle
//!
//! - `init_if_empty()` loads the baseline once. Concurrent callers join the
//!   in-flight fetch instead of issuing their own; a failed fetch resets the
//!   session to uninitialized so the next call retries cleanly.
//! - `begin_draft()` hands out an independent deep copy for editing.
//! - `sync_draft()` is the only path that replaces the baseline, and only
//!   after the backend accepted the change set.

use crate::backend::{ForestSource, VisibilitySaver};
use crate::config::SyncConfig;
use crate::models::{normalize, TreeNode};
use crate::sync::{
    collect_visibility_changes, safe_clone, submit_visibility_changes, DiffOptions, SyncError,
    SyncHooks, SyncOutcome, SyncPhase,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

type InflightFetch = Shared<BoxFuture<'static, Result<(), SyncError>>>;

#[derive(Default)]
struct SessionState {
    tree: Vec<TreeNode>,
    initialized: bool,
    loading: bool,
    error: Option<String>,
    phase: SyncPhase,
    inflight: Option<InflightFetch>,
}

/// Owner of the baseline tree and its UI-side state
pub struct TreeSession {
    state: Arc<Mutex<SessionState>>,
    expanded: StdMutex<HashMap<String, bool>>,
    source: Arc<dyn ForestSource>,
    options: DiffOptions,
}

impl TreeSession {
    pub fn new(source: Arc<dyn ForestSource>) -> Self {
        Self::with_config(source, &SyncConfig::default())
    }

    pub fn with_config(source: Arc<dyn ForestSource>, config: &SyncConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            expanded: StdMutex::new(HashMap::new()),
            source,
            options: config.diff_options(),
        }
    }

    /// Load the baseline unless it is already present.
    ///
    /// Returns immediately when initialized with a non-empty tree. Otherwise
    /// joins the current fetch or starts one; every caller receives the same
    /// result.
    pub async fn init_if_empty(&self) -> Result<(), SyncError> {
        let fetch = {
            let mut state = self.state.lock().await;
            if state.initialized && !state.tree.is_empty() {
                return Ok(());
            }

            if let Some(inflight) = state.inflight.clone() {
                debug!("Joining in-flight tree fetch");
                inflight
            } else {
                state.loading = true;
                state.error = None;
                let fetch = Self::load(self.state.clone(), self.source.clone())
                    .boxed()
                    .shared();
                state.inflight = Some(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    async fn load(state: Arc<Mutex<SessionState>>, source: Arc<dyn ForestSource>) -> Result<(), SyncError> {
        let result = source.fetch_forest().await;

        let mut state = state.lock().await;
        state.loading = false;
        state.inflight = None;

        match result {
            Ok(raw) => {
                state.tree = raw.iter().map(normalize).collect();
                state.initialized = true;
                state.error = None;
                info!("Loaded content tree with {} roots", state.tree.len());
                Ok(())
            }
            Err(e) => {
                let error = SyncError::Fetch(e);
                warn!("{}", error);
                state.error = Some(error.to_string());
                state.initialized = false;
                state.tree.clear();
                Err(error)
            }
        }
    }

    /// Replace the baseline wholesale
    pub async fn set_tree(&self, nodes: Vec<TreeNode>) {
        let mut state = self.state.lock().await;
        state.tree = nodes;
        state.initialized = true;
        state.error = None;
    }

    /// Drop the baseline and return to the uninitialized state
    pub async fn clear_tree(&self) {
        let mut state = self.state.lock().await;
        state.tree.clear();
        state.initialized = false;
        state.error = None;
    }

    /// Copy of the baseline for rendering
    pub async fn nodes_for_view(&self) -> Vec<TreeNode> {
        self.state.lock().await.tree.clone()
    }

    /// Independent copy of the baseline to edit
    pub async fn begin_draft(&self) -> Result<Vec<TreeNode>, SyncError> {
        let state = self.state.lock().await;
        safe_clone(&state.tree)
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Message of the last failed fetch, cleared by the next attempt
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Phase reached by the most recent `sync_draft` call.
    ///
    /// Diffing happens under the session lock, so observers only ever see
    /// `Saving` or a terminal phase.
    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase
    }

    /// Diff `draft` against the baseline, save, and promote on success.
    ///
    /// The baseline lock is not held while the save call is in flight. If
    /// another sync promoted a newer baseline meanwhile, this draft still
    /// replaces it: the last successful sync wins.
    #[instrument(skip_all, fields(draft_roots = draft.len()))]
    pub async fn sync_draft(
        &self,
        draft: &[TreeNode],
        saver: &dyn VisibilitySaver,
        hooks: &SyncHooks,
    ) -> Result<SyncOutcome, SyncError> {
        let changes = {
            let mut state = self.state.lock().await;
            let changes = collect_visibility_changes(&state.tree, draft, self.options);
            state.phase = if changes.is_empty() {
                SyncPhase::NoChange
            } else {
                SyncPhase::Saving
            };
            changes
        };

        let result = submit_visibility_changes(changes, saver, hooks).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(SyncOutcome::Synced { count, message }) => {
                state.tree = draft.to_vec();
                state.initialized = true;
                state.phase = SyncPhase::Synced;
                info!("Promoted draft to baseline after {} changes", count);
                Ok(SyncOutcome::Synced { count, message })
            }
            Ok(SyncOutcome::NoChange) => Ok(SyncOutcome::NoChange),
            Err(e) => {
                state.phase = SyncPhase::Failed;
                Err(e)
            }
        }
    }

    fn expanded(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        self.expanded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded().get(key).copied().unwrap_or(false)
    }

    /// Flip the expansion flag of `key`, returning the new value
    pub fn toggle_expand(&self, key: &str) -> bool {
        let mut expanded = self.expanded();
        let entry = expanded.entry(key.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn set_expanded(&self, key: &str, value: bool) {
        self.expanded().insert(key.to_string(), value);
    }

    pub fn reset_expanded(&self) {
        self.expanded().clear();
    }
}
