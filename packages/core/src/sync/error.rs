//! Sync Error Types

use crate::backend::CollaboratorError;
use crate::ranking::RankingError;
use thiserror::Error;

/// Errors surfaced by the session store and the sync controller.
///
/// `Clone` so a shared in-flight fetch can hand the same failure to every
/// waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Baseline fetch rejected; the session is back to uninitialized
    #[error("Failed to load content tree: {0}")]
    Fetch(#[source] CollaboratorError),

    /// Visibility save rejected; the baseline is unchanged
    #[error("Failed to save visibility changes: {0}")]
    Save(#[source] CollaboratorError),

    /// Both the structural copy and the JSON fallback failed
    #[error("Failed to copy tree: {0}")]
    Clone(String),

    #[error("Popularity ranking failed: {0}")]
    Ranking(#[from] RankingError),
}

impl SyncError {
    /// The collaborator failure behind a fetch or save error, if any
    pub fn collaborator(&self) -> Option<&CollaboratorError> {
        match self {
            SyncError::Fetch(e) | SyncError::Save(e) => Some(e),
            _ => None,
        }
    }
}
