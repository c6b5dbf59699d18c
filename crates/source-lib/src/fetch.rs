//! Concurrent fetch dispatch
//!
//! Issues one HTTP GET per (pod, metric) query task, all tasks in a batch
//! running concurrently. Failures are isolated per task: a failed fetch is
//! recorded as missing data and logged, never propagated. The output has
//! exactly one entry per requested (pod, metric) pair.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::query::QueryTask;

/// Raw payloads keyed by pod id, then metric name. `None` marks a failed
/// fetch or an empty response.
pub type FetchMap = BTreeMap<String, BTreeMap<String, Option<Value>>>;

/// Request timeout per task; there is no separate per-task deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {0}")]
    Status(reqwest::StatusCode),
}

/// Dispatches a batch of query tasks concurrently.
#[derive(Debug, Clone)]
pub struct FetchDispatcher {
    client: Client,
}

impl FetchDispatcher {
    /// Build the dispatcher's HTTP client.
    ///
    /// TLS certificate verification is disabled: the upstream deployment
    /// terminates TLS with an internal certificate.
    pub fn new() -> Result<Self, SourceError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self { client })
    }

    /// Run every task to completion and collect the payloads.
    ///
    /// Each task writes into its own pre-allocated slot, so concurrent
    /// tasks share no mutable state. The call fails only if a task cannot
    /// be joined; individual fetch failures degrade to `None`.
    pub async fn fetch_all(&self, tasks: Vec<QueryTask>) -> Result<FetchMap, SourceError> {
        let mut workers = JoinSet::new();
        for (index, task) in tasks.iter().cloned().enumerate() {
            let client = self.client.clone();
            workers.spawn(async move { (index, fetch_one(&client, &task.url).await) });
        }

        let mut slots: Vec<Option<Value>> = vec![None; tasks.len()];
        while let Some(joined) = workers.join_next().await {
            let (index, outcome) = joined?;
            let task = &tasks[index];
            match outcome {
                Ok(payload) => {
                    debug!(pod = %task.pod_id, metric = %task.metric, "fetched series");
                    slots[index] = payload;
                }
                Err(error) => {
                    warn!(
                        pod = %task.pod_id,
                        metric = %task.metric,
                        url = %task.url,
                        error = %error,
                        "could not fetch metric; treating as missing data"
                    );
                }
            }
        }

        let mut fetched = FetchMap::new();
        for (task, payload) in tasks.into_iter().zip(slots) {
            fetched
                .entry(task.pod_id)
                .or_default()
                .insert(task.metric, payload);
        }
        Ok(fetched)
    }
}

async fn fetch_one(client: &Client, url: &str) -> Result<Option<Value>, FetchError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }
    let body: Value = response.json().await?;
    Ok(non_empty(body))
}

// An empty JSON result means "no data", not an error.
fn non_empty(body: Value) -> Option<Value> {
    match body {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(fields) if fields.is_empty() => None,
        other => Some(other),
    }
}
