//! Print the visibility change set between two forest snapshots
//!
//! Usage: visibility-diff <baseline.json> <draft.json> [config.json]
//!
//! Both snapshots may be bare arrays or `{data: [...]}` / `{result: [...]}`
//! envelopes, exactly as the backend returns them.

use anyhow::{bail, Context, Result};
use notetree_core::sync::collect_visibility_changes;
use notetree_core::{normalize_forest, SyncConfig, TreeNode};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn load_forest(path: &Path) -> Result<Vec<TreeNode>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(normalize_forest(&payload))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: visibility-diff <baseline.json> <draft.json> [config.json]");
    }

    let config = match args.get(2) {
        Some(path) => SyncConfig::from_json_file(path)?,
        None => SyncConfig::default(),
    };

    let baseline = load_forest(Path::new(&args[0]))?;
    let draft = load_forest(Path::new(&args[1]))?;
    tracing::info!(
        "Comparing {} baseline roots against {} draft roots",
        baseline.len(),
        draft.len()
    );

    let changes = collect_visibility_changes(&baseline, &draft, config.diff_options());
    tracing::info!("{} visibility changes", changes.len());

    println!("{}", serde_json::to_string_pretty(&changes)?);
    Ok(())
}
