//! Integration tests for TreeSession and the visibility sync protocol
//!
//! Tests cover:
//! - Single-flight baseline loading
//! - Fetch failure and retry
//! - Save failure leaving the baseline untouched
//! - Draft promotion after a successful sync
//! - Category projections round-tripping through a sync

use anyhow::Result;
use notetree_core::{
    backend::{CollaboratorError, MockBackend},
    sync::{SyncError, SyncHooks, SyncOutcome, SyncPhase, TreeSession},
    tree::{find_by_key, group_by_category, set_subtree_visible, set_visible},
    ChangeRecord, NodeKind, SyncConfig,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn raw_forest() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "currentPath": "/rust",
            "name": "Rust",
            "folder": true,
            "category": "lang",
            "visible": true,
            "children": [
                { "id": 2, "currentPath": "/rust/ownership", "name": "Ownership", "viewCount": "12", "visible": "true" },
                { "id": 3, "currentPath": "/rust/async", "name": "Async", "viewCount": 40, "visible": "false" }
            ]
        }),
        json!({
            "id": 4,
            "currentPath": "/go",
            "name": "Go",
            "folder": true,
            "children": [
                { "id": 5, "currentPath": "/go/channels", "name": "Channels", "viewCount": 7 }
            ]
        }),
    ]
}

/// Test helper: session and backend sharing the same mock
fn create_test_env() -> (TreeSession, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::new(raw_forest()).with_latency(Duration::from_millis(20)));
    let session = TreeSession::with_config(backend.clone(), &SyncConfig::default());
    (session, backend)
}

// =========================================================================
// Baseline Loading Tests
// =========================================================================

#[tokio::test]
async fn test_concurrent_init_fetches_once() -> Result<()> {
    let (session, backend) = create_test_env();
    let session = Arc::new(session);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        handles.push(tokio::spawn(async move { session.init_if_empty().await }));
    }
    for handle in handles {
        assert_ok!(handle.await?);
    }

    assert_eq!(backend.fetch_calls(), 1);
    assert!(session.is_initialized().await);
    assert!(!session.is_loading().await);

    let nodes = session.nodes_for_view().await;
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].id.as_deref(), Some("1"));
    assert_eq!(nodes[0].children[0].view_count, 12);
    assert!(nodes[0].children[0].visible);
    assert!(!nodes[0].children[1].visible);
    assert_eq!(nodes[1].name, "Go");

    // Already loaded: no further fetch
    session.init_if_empty().await?;
    assert_eq!(backend.fetch_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_resets_and_retries() -> Result<()> {
    let (session, backend) = create_test_env();
    backend.fail_next_fetch(CollaboratorError::transport("connection reset"));

    let (first, second) = tokio::join!(session.init_if_empty(), session.init_if_empty());
    assert_eq!(
        first,
        Err(SyncError::Fetch(CollaboratorError::transport("connection reset")))
    );
    assert_eq!(first, second);
    assert_eq!(backend.fetch_calls(), 1);

    assert!(!session.is_initialized().await);
    assert!(session.nodes_for_view().await.is_empty());
    assert!(session.last_error().await.is_some());

    session.init_if_empty().await?;
    assert_eq!(backend.fetch_calls(), 2);
    assert!(session.is_initialized().await);
    assert_eq!(session.last_error().await, None);
    Ok(())
}

#[tokio::test]
async fn test_empty_forest_is_refetched() -> Result<()> {
    let backend = Arc::new(MockBackend::default());
    let session = TreeSession::new(backend.clone());

    session.init_if_empty().await?;
    session.init_if_empty().await?;
    assert_eq!(backend.fetch_calls(), 2);
    Ok(())
}

// =========================================================================
// Sync Tests
// =========================================================================

#[tokio::test]
async fn test_no_change_sync_skips_save() -> Result<()> {
    let (session, backend) = create_test_env();
    session.init_if_empty().await?;

    let draft = session.begin_draft().await?;
    let outcome = session.sync_draft(&draft, backend.as_ref(), &SyncHooks::new()).await?;

    assert_eq!(outcome, SyncOutcome::NoChange);
    assert_eq!(session.phase().await, SyncPhase::NoChange);
    assert_eq!(backend.save_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_successful_sync_promotes_draft() -> Result<()> {
    let (session, backend) = create_test_env();
    session.init_if_empty().await?;

    let messages = Arc::new(AtomicUsize::new(0));
    let seen = messages.clone();
    let hooks = SyncHooks::new().on_success(move |message, count| {
        assert_eq!(message, "Updated visibility of 2 nodes");
        seen.fetch_add(count, Ordering::SeqCst);
    });

    let mut draft = session.begin_draft().await?;
    assert!(set_visible(&mut draft, "4", true));
    assert!(set_visible(&mut draft, "3", true));

    let outcome = session.sync_draft(&draft, backend.as_ref(), &hooks).await?;
    assert_eq!(outcome.count(), 2);
    assert_eq!(messages.load(Ordering::SeqCst), 2);
    assert_eq!(session.phase().await, SyncPhase::Synced);

    assert_eq!(
        backend.saved_batches(),
        vec![vec![
            ChangeRecord {
                path: "/rust/async".to_string(),
                visible: true,
                node_type: NodeKind::Note,
            },
            ChangeRecord {
                path: "/go".to_string(),
                visible: true,
                node_type: NodeKind::Topic,
            },
        ]]
    );

    // Baseline now matches the draft
    assert_eq!(session.nodes_for_view().await, draft);
    let again = session.sync_draft(&draft, backend.as_ref(), &SyncHooks::new()).await?;
    assert_eq!(again, SyncOutcome::NoChange);

    // A fresh session sees the saved state
    let reloaded = TreeSession::new(backend.clone());
    reloaded.init_if_empty().await?;
    let nodes = reloaded.nodes_for_view().await;
    assert!(find_by_key(&nodes, "4").map_or(false, |n| n.visible));
    assert!(find_by_key(&nodes, "3").map_or(false, |n| n.visible));
    Ok(())
}

#[tokio::test]
async fn test_failed_save_keeps_baseline_and_retries() -> Result<()> {
    let (session, backend) = create_test_env();
    session.init_if_empty().await?;
    let before = session.nodes_for_view().await;

    backend.fail_next_save(CollaboratorError::Unauthorized { status: 403 });
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    let hooks = SyncHooks::new().on_error(move |e| {
        assert!(e.collaborator().map_or(false, CollaboratorError::is_auth_failure));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let mut draft = session.begin_draft().await?;
    assert!(set_subtree_visible(&mut draft, "1", false));

    let result = session.sync_draft(&draft, backend.as_ref(), &hooks).await;
    assert_err!(&result);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(session.phase().await, SyncPhase::Failed);
    assert_eq!(session.nodes_for_view().await, before);

    // Same draft, same change set
    let outcome = session.sync_draft(&draft, backend.as_ref(), &hooks).await?;
    assert_eq!(outcome.count(), 2);
    assert_eq!(backend.save_calls(), 2);
    assert_eq!(backend.saved_batches().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_category_projection_sync_keeps_root_kind() -> Result<()> {
    let (session, backend) = create_test_env();
    session.init_if_empty().await?;

    let grouped = group_by_category(&session.nodes_for_view().await);
    session.set_tree(grouped).await;

    let mut draft = session.begin_draft().await?;
    assert!(set_visible(&mut draft, "4", true));

    session.sync_draft(&draft, backend.as_ref(), &SyncHooks::new()).await?;
    assert_eq!(
        backend.saved_batches()[0],
        vec![ChangeRecord {
            path: "/go".to_string(),
            visible: true,
            node_type: NodeKind::Topic,
        }]
    );
    Ok(())
}
