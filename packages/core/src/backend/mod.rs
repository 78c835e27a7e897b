//! Backend Collaborator Contracts
//!
//! The engine performs no I/O of its own. Everything that talks to the
//! backend is injected through the traits below; the HTTP transport that
//! implements them lives outside this crate.
//!
//! - [`ForestSource`] - loads the raw content forest
//! - [`VisibilitySaver`] - persists one batch of visibility changes
//! - [`AssetUrlResolver`] - signs object-storage keys for embedded images
//!
//! [`MockBackend`] implements all three in memory for tests and dev tools.

mod error;
mod mock;

pub use error::CollaboratorError;
pub use mock::MockBackend;

use crate::models::ChangeRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source of the raw content forest.
///
/// Returns the loosely-typed node payloads exactly as the backend sent them;
/// callers run them through [`crate::models::normalize`].
#[async_trait]
pub trait ForestSource: Send + Sync {
    async fn fetch_forest(&self) -> Result<Vec<Value>, CollaboratorError>;
}

/// Sink for visibility changes.
///
/// Called exactly once per sync attempt with the full change set. Returns
/// the backend's acknowledgement message.
#[async_trait]
pub trait VisibilitySaver: Send + Sync {
    async fn save_visibility(&self, changes: &[ChangeRecord]) -> Result<String, CollaboratorError>;
}

/// Signed, time-limited URL for an object-storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait AssetUrlResolver: Send + Sync {
    async fn presigned_url(&self, key: &str) -> Result<PresignedUrl, CollaboratorError>;
}
