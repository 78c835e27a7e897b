//! Display projections over a content forest
//!
//! None of these functions mutate their input: every node in the output is a
//! clone, so projections can be built from the baseline or a draft freely.

use crate::models::{flatten, TreeNode};
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Label of the bucket holding roots with a blank or missing category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Prefix of the synthetic id given to category wrapper nodes
pub const CATEGORY_GROUP_KEY_PREFIX: &str = "group:category:";

/// Synthetic key of the wrapper node for `label`
pub fn category_group_key(label: &str) -> String {
    format!("{}{}", CATEGORY_GROUP_KEY_PREFIX, label)
}

fn category_label(category: Option<&str>) -> &str {
    match category.map(str::trim) {
        Some(label) if !label.is_empty() => label,
        _ => UNCATEGORIZED,
    }
}

/// Case-insensitive label order, case-sensitive on ties, `Uncategorized` last
fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a == UNCATEGORIZED, b == UNCATEGORIZED) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}

/// Wrap the root-level nodes into one synthetic folder per category.
///
/// Only the roots are inspected; each root is cloned with its whole subtree
/// into the bucket of its trimmed `category`.
pub fn group_by_category(roots: &[TreeNode]) -> Vec<TreeNode> {
    let mut buckets: IndexMap<String, Vec<TreeNode>> = IndexMap::new();
    for root in roots {
        let label = category_label(root.category.as_deref());
        buckets
            .entry(label.to_string())
            .or_default()
            .push(root.clone());
    }

    buckets.sort_by(|a, _, b, _| compare_labels(a, b));

    tracing::debug!("Grouped {} roots into {} categories", roots.len(), buckets.len());

    buckets
        .into_iter()
        .map(|(label, children)| TreeNode {
            id: Some(category_group_key(&label)),
            current_path: None,
            name: label,
            folder: true,
            is_category_group: true,
            category: None,
            view_count: 0,
            visible: true,
            children,
        })
        .collect()
}

/// Alphabetic projection.
///
/// The backend already returns the forest in alphabetic order, so this is a
/// deep copy of the input.
pub fn group_by_alpha(nodes: &[TreeNode]) -> Vec<TreeNode> {
    nodes.to_vec()
}

/// Leaf notes of the whole forest, most viewed first.
///
/// Container nodes are dropped (including empty folders). The sort is
/// stable, so equal view counts keep their `flatten` order.
pub fn group_by_popular(nodes: &[TreeNode]) -> Vec<TreeNode> {
    let mut files: Vec<&TreeNode> = flatten(nodes).into_iter().filter(|n| !n.folder).collect();
    files.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    files.into_iter().cloned().collect()
}
