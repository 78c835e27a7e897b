//! Content Tree Node
//!
//! This module defines [`TreeNode`], the single shape used for every entry in
//! the content hierarchy: topic folders, leaf notes, and the synthetic wrapper
//! nodes produced by the grouping projections.
//!
//! # Ingestion
//!
//! Backend payloads are loosely typed. [`normalize`] is the only place where
//! raw JSON becomes a `TreeNode`, and it never fails. The defaulting rules are:
//!
//! | field           | accepted input                         | fallback       |
//! |-----------------|----------------------------------------|----------------|
//! | `id`            | string or number                       | `None`         |
//! | `currentPath`   | string or number                       | `None`         |
//! | `name`          | string; numbers/bools are stringified  | `""`           |
//! | `folder`        | any value, by truthiness               | `false`        |
//! | `category`      | string                                 | `None`         |
//! | `viewCount`     | number, decimal numeric string, bool   | `0`            |
//! | `visible`       | `true` or the string `"true"` only     | `false`        |
//! | `children`      | array, normalized recursively          | `[]`           |
//!
//! `isCategoryGroup` is never read from the backend: wrapper nodes only exist
//! in client-side projections.
//!
//! # Ownership
//!
//! A node owns its children through a plain `Vec`, so the derived `Clone` is a
//! full structural copy. Baseline and draft trees never share a node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of keys derived from `currentPath`
pub const PATH_KEY_PREFIX: &str = "path:";

/// Prefix of keys derived for nodes with neither id nor path
pub const VIRTUAL_KEY_PREFIX: &str = "virtual:";

/// One entry of the content hierarchy.
///
/// # Fields
///
/// - `id`: stable backend identifier, absent for synthetic nodes
/// - `current_path`: unique backend path, absent for synthetic containers
/// - `name`: display label
/// - `folder`: container flag (topics and group wrappers)
/// - `is_category_group`: presentation-only category wrapper
/// - `category`: classification of root-level real nodes
/// - `view_count`: popularity counter
/// - `visible`: the field tracked by the visibility diff
/// - `children`: ordered, exclusively owned child nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: Option<String>,

    pub current_path: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub folder: bool,

    #[serde(default)]
    pub is_category_group: bool,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub view_count: u64,

    #[serde(default)]
    pub visible: bool,

    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a bare node with only a display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.current_path = Some(path.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_view_count(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Mark the node as a container and attach its children
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.folder = true;
        self.children = children;
        self
    }

    /// Key of this node without a positional index
    pub fn key(&self) -> String {
        node_key(self, None)
    }

    /// True when the node has no children, regardless of `folder`
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True for nodes with no backend identity (neither id nor path)
    pub fn is_virtual(&self) -> bool {
        non_empty(&self.id).is_none() && non_empty(&self.current_path).is_none()
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }
}

/// Derive the lookup key of a node.
///
/// The id wins when present, then `path:<currentPath>`, then
/// `virtual:<name>` with `:<index>` appended when a positional index is
/// supplied. Empty strings count as absent.
pub fn node_key(node: &TreeNode, index: Option<usize>) -> String {
    if let Some(id) = non_empty(&node.id) {
        return id.to_string();
    }
    if let Some(path) = non_empty(&node.current_path) {
        return format!("{}{}", PATH_KEY_PREFIX, path);
    }
    match index {
        Some(idx) => format!("{}{}:{}", VIRTUAL_KEY_PREFIX, node.name, idx),
        None => format!("{}{}", VIRTUAL_KEY_PREFIX, node.name),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Collect the leaves of a forest in pre-order.
///
/// A node is emitted iff its `children` are empty; the `folder` flag is
/// ignored. The returned references borrow from `nodes`.
pub fn flatten(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    fn walk<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
        for node in nodes {
            if node.children.is_empty() {
                out.push(node);
            } else {
                walk(&node.children, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

/// Parse one loosely-typed backend node. Never fails.
pub fn normalize(raw: &Value) -> TreeNode {
    TreeNode {
        id: coerce_identifier(raw.get("id")),
        current_path: coerce_identifier(raw.get("currentPath")),
        name: coerce_label(raw.get("name")),
        folder: raw.get("folder").map(is_truthy).unwrap_or(false),
        is_category_group: false,
        category: raw
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string),
        view_count: coerce_view_count(raw.get("viewCount")),
        visible: coerce_visible(raw.get("visible")),
        children: raw
            .get("children")
            .and_then(Value::as_array)
            .map(|children| children.iter().map(normalize).collect())
            .unwrap_or_default(),
    }
}

/// Unwrap the item list out of a backend response envelope.
///
/// Accepts a bare array, `{"data": [...]}` or `{"result": [...]}`. Anything
/// else yields an empty list.
pub fn payload_items(payload: &Value) -> &[Value] {
    if let Some(items) = payload.as_array() {
        return items;
    }
    for field in ["data", "result"] {
        if let Some(items) = payload.get(field).and_then(Value::as_array) {
            return items;
        }
    }
    &[]
}

/// Normalize every node of a backend response envelope
pub fn normalize_forest(payload: &Value) -> Vec<TreeNode> {
    payload_items(payload).iter().map(normalize).collect()
}

fn coerce_identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn coerce_view_count(value: Option<&Value>) -> u64 {
    let count = match value {
        Some(Value::Number(n)) => {
            if let Some(exact) = n.as_u64() {
                return exact;
            }
            n.as_f64().unwrap_or(0.0)
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };

    if count.is_finite() && count > 0.0 {
        count.trunc() as u64
    } else {
        0
    }
}

fn coerce_visible(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
