//! Print a display projection of a forest snapshot
//!
//! Usage: tree-groups <forest.json> [category|alpha|popular]

use anyhow::{bail, Context, Result};
use notetree_core::ranking::{group_by_popular_offloaded, PopularWorker};
use notetree_core::tree::{group_by_alpha, group_by_category};
use notetree_core::{normalize_forest, SyncConfig, TreeNode};
use tracing_subscriber::EnvFilter;

fn print_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let marker = if node.visible { "+" } else { "-" };
        let label = if node.name.is_empty() {
            node.key()
        } else {
            node.name.clone()
        };
        if node.folder {
            println!("{}{} {}/", "  ".repeat(depth), marker, label);
        } else {
            println!("{}{} {} ({} views)", "  ".repeat(depth), marker, label, node.view_count);
        }
        print_tree(&node.children, depth + 1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, mode) = match args.as_slice() {
        [path] => (path, "category"),
        [path, mode] => (path, mode.as_str()),
        _ => bail!("usage: tree-groups <forest.json> [category|alpha|popular]"),
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    let payload: serde_json::Value =
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path))?;
    let forest = normalize_forest(&payload);

    let projected = match mode {
        "category" => group_by_category(&forest),
        "alpha" => group_by_alpha(&forest),
        "popular" => {
            let config = SyncConfig::default();
            let worker = PopularWorker::spawn()?;
            group_by_popular_offloaded(&forest, &worker, config.popular_offload_threshold).await
        }
        other => bail!("unknown grouping mode: {}", other),
    };

    tracing::info!("{} mode: {} top-level entries", mode, projected.len());
    print_tree(&projected, 0);
    Ok(())
}
