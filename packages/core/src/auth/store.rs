use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use crate::backend::CollaboratorError;

/// Persisted login, written on JWT login and removed on logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub token: String,
    #[serde(default)]
    pub username: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredCredential>, CollaboratorError>;
    async fn store(&self, credential: &StoredCredential) -> Result<(), CollaboratorError>;
    async fn clear(&self) -> Result<(), CollaboratorError>;
}

/// Process-local store
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<StoredCredential>> {
        self.credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredential>, CollaboratorError> {
        Ok(self.slot().clone())
    }

    async fn store(&self, credential: &StoredCredential) -> Result<(), CollaboratorError> {
        *self.slot() = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CollaboratorError> {
        *self.slot() = None;
        Ok(())
    }
}

/// JSON file store. A missing file means no credential.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredential>, CollaboratorError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| CollaboratorError::unavailable(format!("Failed to read credential file: {}", e)))?;

        match serde_json::from_str(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable credential file {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    async fn store(&self, credential: &StoredCredential) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                CollaboratorError::unavailable(format!("Failed to create credential directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(credential)
            .map_err(|e| CollaboratorError::unavailable(format!("Failed to serialize credential: {}", e)))?;

        fs::write(&self.path, contents)
            .await
            .map_err(|e| CollaboratorError::unavailable(format!("Failed to write credential file: {}", e)))
    }

    async fn clear(&self) -> Result<(), CollaboratorError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CollaboratorError::unavailable(format!(
                "Failed to remove credential file: {}",
                e
            ))),
        }
    }
}
