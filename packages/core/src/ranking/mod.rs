//! Popularity Ranking
//!
//! The popularity projection can run its sort on a background worker when the
//! list of leaf notes is large. [`group_by_popular_offloaded`] picks the path
//! and falls back to the synchronous sort if the worker fails;
//! [`try_group_by_popular_offloaded`] reports the failure instead.

mod worker;

pub use worker::{rank_entries, PopularEntry, PopularWorker, RankingError};

use crate::models::{flatten, node_key, TreeNode};
use crate::sync::SyncError;
use crate::tree::group_by_popular;
use std::collections::HashMap;

fn popular_files(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    flatten(nodes).into_iter().filter(|n| !n.folder).collect()
}

/// Ranking input for `files`, in order.
///
/// Each key is the node key suffixed with `#<position>`, so it stays unique
/// even when ids or paths repeat.
fn popular_entries(files: &[&TreeNode]) -> Vec<PopularEntry> {
    files
        .iter()
        .enumerate()
        .map(|(index, node)| {
            PopularEntry::new(
                format!("{}#{}", node_key(node, Some(index)), index),
                node.view_count,
            )
        })
        .collect()
}

/// Popularity projection sorted on `worker`, failing if the worker does.
///
/// The worker is always used, whatever the list size.
pub async fn try_group_by_popular_offloaded(
    nodes: &[TreeNode],
    worker: &PopularWorker,
) -> Result<Vec<TreeNode>, SyncError> {
    let files = popular_files(nodes);
    let entries = popular_entries(&files);

    let by_key: HashMap<&str, &TreeNode> = entries
        .iter()
        .map(|entry| entry.key.as_str())
        .zip(files.iter().copied())
        .collect();

    let keys = worker.run(entries.clone()).await?;

    Ok(keys
        .iter()
        .filter_map(|key| by_key.get(key.as_str()))
        .map(|node| (*node).clone())
        .collect())
}

/// Popularity projection, sorted on `worker` when the leaf count exceeds
/// `threshold`.
///
/// Produces the same result as [`group_by_popular`]. Worker failures are
/// logged and answered with the synchronous sort.
pub async fn group_by_popular_offloaded(
    nodes: &[TreeNode],
    worker: &PopularWorker,
    threshold: usize,
) -> Vec<TreeNode> {
    if popular_files(nodes).len() <= threshold {
        return group_by_popular(nodes);
    }

    match try_group_by_popular_offloaded(nodes, worker).await {
        Ok(projected) => projected,
        Err(e) => {
            tracing::warn!("Popularity worker failed, sorting inline: {}", e);
            group_by_popular(nodes)
        }
    }
}
