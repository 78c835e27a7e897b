use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Duration};

use super::{AssetUrlResolver, CollaboratorError, ForestSource, PresignedUrl, VisibilitySaver};
use crate::models::ChangeRecord;

/// In-memory backend for tests and offline tooling.
///
/// Holds the raw forest JSON, applies saved visibility changes to it so a
/// later fetch reflects them, and can be scripted to fail the next fetch or
/// save.
pub struct MockBackend {
    forest: Mutex<Vec<Value>>,
    saved: Mutex<Vec<Vec<ChangeRecord>>>,
    assets: Mutex<HashMap<String, String>>,
    fetch_failures: Mutex<VecDeque<CollaboratorError>>,
    save_failures: Mutex<VecDeque<CollaboratorError>>,
    fetch_calls: AtomicUsize,
    save_calls: AtomicUsize,
    asset_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl MockBackend {
    pub fn new(forest: Vec<Value>) -> Self {
        Self {
            forest: Mutex::new(forest),
            saved: Mutex::new(Vec::new()),
            assets: Mutex::new(HashMap::new()),
            fetch_failures: Mutex::new(VecDeque::new()),
            save_failures: Mutex::new(VecDeque::new()),
            fetch_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            asset_calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Delay every call, which widens the window for concurrent callers
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register a signable asset key
    pub fn with_asset(self, key: impl Into<String>, url: impl Into<String>) -> Self {
        lock(&self.assets).insert(key.into(), url.into());
        self
    }

    pub fn fail_next_fetch(&self, error: CollaboratorError) {
        lock(&self.fetch_failures).push_back(error);
    }

    pub fn fail_next_save(&self, error: CollaboratorError) {
        lock(&self.save_failures).push_back(error);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn asset_calls(&self) -> usize {
        self.asset_calls.load(Ordering::SeqCst)
    }

    /// Every accepted change batch, in call order
    pub fn saved_batches(&self) -> Vec<Vec<ChangeRecord>> {
        lock(&self.saved).clone()
    }

    /// Current raw forest, including applied visibility changes
    pub fn forest(&self) -> Vec<Value> {
        lock(&self.forest).clone()
    }

    async fn simulate_network_delay(&self) {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn apply_visibility(nodes: &mut [Value], change: &ChangeRecord) {
    for node in nodes.iter_mut() {
        if node.get("currentPath").and_then(Value::as_str) == Some(change.path.as_str()) {
            if let Some(object) = node.as_object_mut() {
                object.insert("visible".to_string(), Value::Bool(change.visible));
            }
        }
        if let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) {
            apply_visibility(children, change);
        }
    }
}

#[async_trait]
impl ForestSource for MockBackend {
    async fn fetch_forest(&self) -> Result<Vec<Value>, CollaboratorError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network_delay().await;

        if let Some(error) = lock(&self.fetch_failures).pop_front() {
            return Err(error);
        }
        Ok(lock(&self.forest).clone())
    }
}

#[async_trait]
impl VisibilitySaver for MockBackend {
    async fn save_visibility(&self, changes: &[ChangeRecord]) -> Result<String, CollaboratorError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network_delay().await;

        if let Some(error) = lock(&self.save_failures).pop_front() {
            return Err(error);
        }

        {
            let mut forest = lock(&self.forest);
            for change in changes {
                apply_visibility(&mut forest, change);
            }
        }
        lock(&self.saved).push(changes.to_vec());

        Ok(format!("Updated visibility of {} nodes", changes.len()))
    }
}

#[async_trait]
impl AssetUrlResolver for MockBackend {
    async fn presigned_url(&self, key: &str) -> Result<PresignedUrl, CollaboratorError> {
        self.asset_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network_delay().await;

        let url = lock(&self.assets)
            .get(key)
            .cloned()
            .ok_or_else(|| CollaboratorError::rejected(format!("Unknown object key: {}", key)))?;

        Ok(PresignedUrl {
            url,
            expires_at: Utc::now() + ChronoDuration::minutes(15),
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
