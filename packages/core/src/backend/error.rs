//! Collaborator Error Types
//!
//! Failures reported by the injected transport layer (tree fetch, visibility
//! save, asset URL signing). The type is `Clone` so one failed in-flight fetch
//! can be handed to every caller awaiting it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Request never reached the backend or the response was unreadable
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Backend answered 401 or 403
    #[error("Not authorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Backend answered but refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Collaborator cannot serve requests right now
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// True for 401/403 responses, which invalidate the session credential
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
