//! Visibility sync payload types

use serde::{Deserialize, Serialize};

/// Coarse-vs-fine node classification used in sync payloads.
///
/// Derived from tree depth at diff time: depth 0 is a `Topic`, anything
/// deeper is a `Note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Topic,
    Note,
}

impl NodeKind {
    pub fn from_depth(depth: usize) -> Self {
        if depth == 0 {
            NodeKind::Topic
        } else {
            NodeKind::Note
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Topic => "TOPIC",
            NodeKind::Note => "NOTE",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One path's new visibility, as sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub path: String,
    pub visible: bool,
    pub node_type: NodeKind,
}
