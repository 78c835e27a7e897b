//! Baseline-vs-draft visibility diff
//!
//! Both forests are reduced to an insertion-ordered map of
//! `currentPath → (visible, kind)`. A change record is emitted for every
//! draft path that is new or whose visibility differs from the baseline.
//! Paths present only in the baseline are not reported: deletions are not
//! part of this protocol.

use crate::models::{ChangeRecord, NodeKind, TreeNode};
use crate::sync::SyncError;
use crate::tree::TreeRef;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOptions {
    /// Treat category wrapper nodes as transparent: they never produce an
    /// entry, and their children keep the wrapper's depth.
    #[serde(default)]
    pub skip_category_group: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub visible: bool,
    pub node_type: NodeKind,
}

/// Path-keyed visibility, in pre-order of first encounter
pub type VisibilityMap = IndexMap<String, VisibilityEntry>;

fn collect_entries(nodes: &[TreeNode], depth: usize, options: DiffOptions, out: &mut VisibilityMap) {
    for node in nodes {
        if options.skip_category_group && node.is_category_group {
            collect_entries(&node.children, depth, options, out);
            continue;
        }

        if let Some(path) = node.current_path.as_deref().filter(|p| !p.is_empty()) {
            out.insert(
                path.to_string(),
                VisibilityEntry {
                    visible: node.visible,
                    node_type: NodeKind::from_depth(depth),
                },
            );
        }

        collect_entries(&node.children, depth + 1, options, out);
    }
}

/// Flatten a forest into its path → visibility map.
///
/// Nodes without a `currentPath` contribute nothing, but their descendants
/// are still visited.
pub fn to_visibility_map<'a>(nodes: impl Into<TreeRef<'a>>, options: DiffOptions) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    collect_entries(nodes.into().nodes(), 0, options, &mut map);
    map
}

/// Compute the change set that turns `baseline` into `draft`.
///
/// Pure function of its inputs. `baseline` may be empty (first sync), in
/// which case every path of the draft is reported.
pub fn collect_visibility_changes<'a, 'b>(
    baseline: impl Into<TreeRef<'a>>,
    draft: impl Into<TreeRef<'b>>,
    options: DiffOptions,
) -> Vec<ChangeRecord> {
    let base_map = to_visibility_map(baseline, options);
    let draft_map = to_visibility_map(draft, options);

    let changes: Vec<ChangeRecord> = draft_map
        .into_iter()
        .filter(|(path, entry)| {
            base_map
                .get(path)
                .map_or(true, |base| base.visible != entry.visible)
        })
        .map(|(path, entry)| ChangeRecord {
            path,
            visible: entry.visible,
            node_type: entry.node_type,
        })
        .collect();

    tracing::debug!(
        "Visibility diff: {} baseline paths, {} changes",
        base_map.len(),
        changes.len()
    );

    changes
}

/// Independent deep copy of plain data.
///
/// Uses `Clone` first; if that panics, falls back to a JSON round trip.
/// Either way the result shares no state with `value`.
pub fn safe_clone<T>(value: &T) -> Result<T, SyncError>
where
    T: Clone + Serialize + DeserializeOwned,
{
    match catch_unwind(AssertUnwindSafe(|| value.clone())) {
        Ok(copy) => Ok(copy),
        Err(_) => {
            tracing::warn!("Structural clone panicked, falling back to JSON round trip");
            let json = serde_json::to_value(value).map_err(|e| SyncError::Clone(e.to_string()))?;
            serde_json::from_value(json).map_err(|e| SyncError::Clone(e.to_string()))
        }
    }
}
