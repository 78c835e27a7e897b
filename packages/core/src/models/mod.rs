//! Data Models
//!
//! - `TreeNode` - the content hierarchy node and its ingestion helpers
//! - `ChangeRecord` / `NodeKind` - the visibility sync payload
//!
//! Everything here is plain owned data; no I/O happens in this module.

mod node;
mod visibility;

pub use node::{
    flatten, node_key, normalize, normalize_forest, payload_items, TreeNode, PATH_KEY_PREFIX,
    VIRTUAL_KEY_PREFIX,
};
pub use visibility::{ChangeRecord, NodeKind};

#[cfg(test)]
mod node_test;
