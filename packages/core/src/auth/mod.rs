//! Session credential handling
//!
//! Decides which requests carry the bearer token, persists the token through
//! a [`CredentialStore`], and drops it when the backend answers 401 or 403.

mod store;

pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential};

use crate::backend::CollaboratorError;
use crate::config::SyncConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Whether a request to `url` should carry the session credential.
///
/// Absolute URLs are reduced to their path. Public prefixes win over
/// protected ones; anything matching neither goes out without a credential.
pub fn should_attach_credential(url: &str, config: &SyncConfig) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    let path = request_path(url);
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if config.public_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return false;
    }
    config
        .protected_prefixes
        .iter()
        .any(|p| path.starts_with(p.as_str()))
}

fn request_path(url: &str) -> &str {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    let rest = if lower.starts_with("https://") {
        &url[8..]
    } else if lower.starts_with("http://") {
        &url[7..]
    } else {
        return url;
    };

    match rest.find(['/', '?', '#']) {
        Some(idx) if rest[idx..].starts_with('/') => &rest[idx..],
        _ => "/",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Anonymous,
    Guest,
    Jwt,
}

#[derive(Debug, Clone, Default)]
struct AuthState {
    mode: AuthMode,
    token: String,
    username: String,
}

/// Current login of one user session
pub struct AuthSession {
    state: Mutex<AuthState>,
    store: Arc<dyn CredentialStore>,
    config: SyncConfig,
}

impl AuthSession {
    pub fn new(store: Arc<dyn CredentialStore>, config: SyncConfig) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            store,
            config,
        }
    }

    /// Resume from the persisted credential, or continue as guest
    pub async fn restore(&self) -> Result<AuthMode, CollaboratorError> {
        let stored = self.store.load().await?;
        let mut state = self.state.lock().await;
        match stored {
            Some(credential) if !credential.token.is_empty() => {
                state.mode = AuthMode::Jwt;
                state.token = credential.token;
                state.username = credential.username;
                info!("Restored session for {}", state.username);
            }
            _ => {
                state.mode = AuthMode::Guest;
                state.token.clear();
                state.username = "guest".to_string();
            }
        }
        Ok(state.mode)
    }

    pub async fn login_with_jwt(
        &self,
        token: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), CollaboratorError> {
        let credential = StoredCredential {
            token: token.into(),
            username: username.into(),
        };
        self.store.store(&credential).await?;

        let mut state = self.state.lock().await;
        state.mode = AuthMode::Jwt;
        state.token = credential.token;
        state.username = credential.username;
        Ok(())
    }

    pub async fn login_guest(&self, username: Option<&str>) -> Result<(), CollaboratorError> {
        self.store.clear().await?;

        let mut state = self.state.lock().await;
        state.mode = AuthMode::Guest;
        state.token.clear();
        state.username = username.unwrap_or("guest").to_string();
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), CollaboratorError> {
        self.store.clear().await?;
        *self.state.lock().await = AuthState::default();
        Ok(())
    }

    pub async fn mode(&self) -> AuthMode {
        self.state.lock().await.mode
    }

    pub async fn username(&self) -> String {
        self.state.lock().await.username.clone()
    }

    /// Guest and JWT sessions both count as logged in
    pub async fn is_logged_in(&self) -> bool {
        self.mode().await != AuthMode::Anonymous
    }

    pub async fn is_admin(&self) -> bool {
        self.mode().await == AuthMode::Jwt
    }

    /// `Authorization` header value for a request to `url`, if any
    pub async fn authorization_header(&self, url: &str) -> Option<String> {
        let state = self.state.lock().await;
        if state.mode != AuthMode::Jwt || state.token.is_empty() {
            return None;
        }
        should_attach_credential(url, &self.config).then(|| format!("Bearer {}", state.token))
    }

    /// React to a response status.
    ///
    /// On 401 or 403 the credential is dropped and `true` is returned so the
    /// caller can show a permission prompt.
    pub async fn on_response_status(&self, status: u16) -> bool {
        if status != 401 && status != 403 {
            return false;
        }

        warn!("Backend refused the request with status {}", status);
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear stored credential: {}", e);
        }

        let mut state = self.state.lock().await;
        if state.mode == AuthMode::Jwt {
            debug!("Dropping credential for {}", state.username);
            *state = AuthState::default();
        }
        true
    }
}
