//! Background popularity ranker
//!
//! Sorting a large popularity list is pure CPU work, so it runs on a
//! dedicated OS thread instead of the async runtime. Each request carries its
//! own `oneshot` reply channel: the channel is consumed on a reply and dropped
//! on failure, so nothing accumulates across calls. Dropping the future
//! returned by [`PopularWorker::run`] cancels the wait; the late reply is
//! discarded by the worker.

use serde::{Deserialize, Serialize};
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Lightweight sort input: a node key and its view count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularEntry {
    pub key: String,
    pub view_count: u64,
}

impl PopularEntry {
    pub fn new(key: impl Into<String>, view_count: u64) -> Self {
        Self {
            key: key.into(),
            view_count,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("Ranking worker has shut down")]
    WorkerClosed,

    #[error("Ranking worker dropped the request without replying")]
    NoReply,

    #[error("Failed to start ranking worker: {0}")]
    Spawn(String),
}

/// Keys ordered by descending view count; ties keep their input order
pub fn rank_entries(mut entries: Vec<PopularEntry>) -> Vec<String> {
    entries.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    entries.into_iter().map(|entry| entry.key).collect()
}

struct RankRequest {
    entries: Vec<PopularEntry>,
    reply: oneshot::Sender<Vec<String>>,
}

/// Handle to a dedicated ranking thread.
///
/// The request queue holds a single slot: a second caller waits until the
/// current request has been picked up. Dropping the handle stops the thread
/// once it finishes the request it is working on.
pub struct PopularWorker {
    requests: mpsc::Sender<RankRequest>,
    _thread: Option<JoinHandle<()>>,
}

impl PopularWorker {
    pub fn spawn() -> Result<Self, RankingError> {
        Self::start(|request| {
            let count = request.entries.len();
            let keys = rank_entries(request.entries);
            if request.reply.send(keys).is_err() {
                tracing::debug!("Ranking caller went away before the reply ({} entries)", count);
            }
        })
    }

    fn start<F>(mut handle: F) -> Result<Self, RankingError>
    where
        F: FnMut(RankRequest) + Send + 'static,
    {
        let (requests, mut inbox) = mpsc::channel::<RankRequest>(1);

        let thread = std::thread::Builder::new()
            .name("popular-ranker".to_string())
            .spawn(move || {
                while let Some(request) = inbox.blocking_recv() {
                    handle(request);
                }
                tracing::debug!("Popular ranking worker stopped");
            })
            .map_err(|e| RankingError::Spawn(e.to_string()))?;

        Ok(Self {
            requests,
            _thread: Some(thread),
        })
    }

    /// Worker whose thread is already gone
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (requests, inbox) = mpsc::channel::<RankRequest>(1);
        drop(inbox);
        Self {
            requests,
            _thread: None,
        }
    }

    /// Worker that accepts requests and drops them unanswered
    #[cfg(test)]
    pub(crate) fn dropping_replies() -> Self {
        Self::start(drop).unwrap()
    }

    /// Rank `entries` on the worker thread
    pub async fn run(&self, entries: Vec<PopularEntry>) -> Result<Vec<String>, RankingError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(RankRequest { entries, reply })
            .await
            .map_err(|_| RankingError::WorkerClosed)?;
        response.await.map_err(|_| RankingError::NoReply)
    }
}
