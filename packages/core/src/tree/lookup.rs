//! Key-based lookup and visibility mutation
//!
//! Callers hand in "a node, a forest, or nothing". [`TreeRef`] and [`TreeMut`]
//! turn that into an explicit sum type once, at the boundary, so the
//! traversal code only ever walks a slice.
//!
//! Search order is depth-first pre-order: a node is tested before its
//! children, and its whole subtree before its next sibling. A node matches a
//! key when `node_key(node, None)` equals it; virtual nodes also match the
//! indexed form `virtual:<name>:<sibling index>`.

use crate::models::{node_key, TreeNode};

/// Read-only search space
#[derive(Debug, Clone, Copy, Default)]
pub enum TreeRef<'a> {
    #[default]
    Empty,
    Single(&'a TreeNode),
    Forest(&'a [TreeNode]),
}

impl<'a> TreeRef<'a> {
    pub fn nodes(self) -> &'a [TreeNode] {
        match self {
            TreeRef::Empty => &[],
            TreeRef::Single(node) => std::slice::from_ref(node),
            TreeRef::Forest(nodes) => nodes,
        }
    }
}

impl<'a> From<&'a TreeNode> for TreeRef<'a> {
    fn from(node: &'a TreeNode) -> Self {
        TreeRef::Single(node)
    }
}

impl<'a> From<&'a [TreeNode]> for TreeRef<'a> {
    fn from(nodes: &'a [TreeNode]) -> Self {
        TreeRef::Forest(nodes)
    }
}

impl<'a> From<&'a Vec<TreeNode>> for TreeRef<'a> {
    fn from(nodes: &'a Vec<TreeNode>) -> Self {
        TreeRef::Forest(nodes.as_slice())
    }
}

impl<'a, T: Into<TreeRef<'a>>> From<Option<T>> for TreeRef<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Mutable search space
#[derive(Debug, Default)]
pub enum TreeMut<'a> {
    #[default]
    Empty,
    Single(&'a mut TreeNode),
    Forest(&'a mut [TreeNode]),
}

impl<'a> TreeMut<'a> {
    pub fn into_nodes(self) -> &'a mut [TreeNode] {
        match self {
            TreeMut::Empty => &mut [],
            TreeMut::Single(node) => std::slice::from_mut(node),
            TreeMut::Forest(nodes) => nodes,
        }
    }
}

impl<'a> From<&'a mut TreeNode> for TreeMut<'a> {
    fn from(node: &'a mut TreeNode) -> Self {
        TreeMut::Single(node)
    }
}

impl<'a> From<&'a mut [TreeNode]> for TreeMut<'a> {
    fn from(nodes: &'a mut [TreeNode]) -> Self {
        TreeMut::Forest(nodes)
    }
}

impl<'a> From<&'a mut Vec<TreeNode>> for TreeMut<'a> {
    fn from(nodes: &'a mut Vec<TreeNode>) -> Self {
        TreeMut::Forest(nodes.as_mut_slice())
    }
}

impl<'a, T: Into<TreeMut<'a>>> From<Option<T>> for TreeMut<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

fn matches_key(node: &TreeNode, index: usize, key: &str) -> bool {
    node_key(node, None) == key || (node.is_virtual() && node_key(node, Some(index)) == key)
}

fn find_in<'a>(nodes: &'a [TreeNode], key: &str) -> Option<&'a TreeNode> {
    for (index, node) in nodes.iter().enumerate() {
        if matches_key(node, index, key) {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, key) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [TreeNode], key: &str) -> Option<&'a mut TreeNode> {
    for (index, node) in nodes.iter_mut().enumerate() {
        if matches_key(node, index, key) {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, key) {
            return Some(found);
        }
    }
    None
}

/// First node in pre-order whose key equals `key`
pub fn find_by_key<'a>(tree: impl Into<TreeRef<'a>>, key: &str) -> Option<&'a TreeNode> {
    find_in(tree.into().nodes(), key)
}

/// Mutable variant of [`find_by_key`]
pub fn find_by_key_mut<'a>(tree: impl Into<TreeMut<'a>>, key: &str) -> Option<&'a mut TreeNode> {
    find_in_mut(tree.into().into_nodes(), key)
}

/// Set `visible` on the single node identified by `key`.
///
/// Returns `false` when no node matches; the tree is left untouched.
pub fn set_visible<'a>(tree: impl Into<TreeMut<'a>>, key: &str, visible: bool) -> bool {
    match find_by_key_mut(tree, key) {
        Some(node) => {
            node.visible = visible;
            true
        }
        None => {
            tracing::debug!("set_visible: no node with key '{}'", key);
            false
        }
    }
}

/// Set `visible` on the node identified by `key` and on every descendant.
///
/// The whole subtree is rewritten unconditionally. Returns `false` when no
/// node matches.
pub fn set_subtree_visible<'a>(tree: impl Into<TreeMut<'a>>, key: &str, visible: bool) -> bool {
    fn walk(node: &mut TreeNode, visible: bool) {
        node.visible = visible;
        for child in node.children.iter_mut() {
            walk(child, visible);
        }
    }

    match find_by_key_mut(tree, key) {
        Some(node) => {
            walk(node, visible);
            true
        }
        None => {
            tracing::debug!("set_subtree_visible: no node with key '{}'", key);
            false
        }
    }
}
