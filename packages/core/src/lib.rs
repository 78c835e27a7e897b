//! NoteTree Core
//!
//! Client-side state for a hierarchical notes site: the content tree, its
//! display projections, and the visibility sync protocol that pushes
//! administrator edits back to the backend.
//!
//! # Architecture
//!
//! - **Baseline vs. draft**: the session holds the last-synced forest; edits
//!   happen on an independent deep copy and are diffed back by `currentPath`
//! - **One save per sync**: a change set is sent as a single batch, and the
//!   baseline only moves after the backend accepts it
//! - **Collaborators behind traits**: fetch, save, and asset signing are
//!   async traits so tests and tools run against [`backend::MockBackend`]
//!
//! # Modules
//!
//! - [`models`] - Tree node, payload normalization, change records
//! - [`tree`] - Key lookup, visibility mutation, display projections
//! - [`sync`] - Visibility diff, sync controller, session store
//! - [`ranking`] - Background popularity ranking
//! - [`auth`] - Session credential rules and storage
//! - [`backend`] - Collaborator traits and the in-memory backend
//! - [`config`] - Runtime configuration
//! - [`utils`] - Markdown asset link rewriting

pub mod auth;
pub mod backend;
pub mod config;
pub mod models;
pub mod ranking;
pub mod sync;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigError, SyncConfig};
pub use models::*;
pub use sync::{SyncError, SyncHooks, SyncOutcome, SyncPhase, TreeSession};
