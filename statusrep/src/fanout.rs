//! Fan-out coordinator
//!
//! Polls every host concurrently and feeds each answer into one shared
//! [`AggregateTable`]:
//! - one tokio task per entry of the host list (duplicates included)
//! - per-host failures are logged and contribute nothing
//! - [`FanOut::poll_all`] only returns once every task has finished
//!
//! Concurrency is unbounded unless a cap is configured, in which case tasks
//! wait on a semaphore before querying their host.

use crate::client::HostClient;
use crate::endpoint::status_url;
use crate::error::StatusError;
use crate::metrics::AggregateTable;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// A host that could not contribute to the aggregate.
#[derive(Debug)]
pub struct HostFailure {
    pub host: String,
    pub error: StatusError,
}

/// Result of a completed fan-out.
#[derive(Debug)]
pub struct PollOutcome {
    pub table: AggregateTable,
    pub succeeded: usize,
    pub failures: Vec<HostFailure>,
    /// Tasks that ended without reporting back (panicked).
    pub aborted: usize,
}

impl PollOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len() + self.aborted
    }
}

#[derive(Clone, Debug)]
pub struct FanOut {
    client: HostClient,
    limit: Option<Arc<Semaphore>>,
}

impl FanOut {
    pub fn new(client: HostClient) -> Self {
        Self { client, limit: None }
    }

    /// Caps the number of hosts queried at once. `None` or `Some(0)` leaves
    /// the fan-out unbounded.
    pub fn with_max_concurrency(mut self, max: Option<usize>) -> Self {
        self.limit = match max {
            Some(n) if n > 0 => Some(Arc::new(Semaphore::new(n))),
            _ => None,
        };
        self
    }

    /// Queries every host and merges the answers, returning after all of
    /// them have completed or failed.
    pub async fn poll_all(&self, hosts: &[String], base_url: &str) -> PollOutcome {
        let table = AggregateTable::new();
        let base_url: Arc<str> = Arc::from(base_url);
        let mut tasks = JoinSet::new();

        info!(hosts = hosts.len(), bounded = self.limit.is_some(), "dispatching status queries");

        for host in hosts {
            let host = host.clone();
            let client = self.client.clone();
            let base_url = Arc::clone(&base_url);
            let table = table.clone();
            let limit = self.limit.clone();

            tasks.spawn(async move {
                let _permit = match limit {
                    // The semaphore is never closed.
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let result = poll_host(&client, &base_url, &host, &table).await;
                (host, result)
            });
        }

        let mut succeeded = 0;
        let mut failures = Vec::new();
        let mut aborted = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((host, Ok(()))) => {
                    debug!(host = %host, "host merged");
                    succeeded += 1;
                }
                Ok((host, Err(err))) => {
                    warn!(host = %host, kind = err.kind(), error = %err, "could not get status for host");
                    failures.push(HostFailure { host, error: err });
                }
                Err(join_err) => {
                    error!(error = %join_err, "status query task aborted");
                    aborted += 1;
                }
            }
        }

        info!(
            succeeded,
            failed = failures.len(),
            aborted,
            applications = table.len(),
            "all status queries completed"
        );

        PollOutcome {
            table,
            succeeded,
            failures,
            aborted,
        }
    }
}

/// Builds the URL, queries it and merges the status on success.
pub async fn poll_host(
    client: &HostClient,
    base_url: &str,
    host: &str,
    table: &AggregateTable,
) -> Result<(), StatusError> {
    let url = status_url(base_url, host)?;
    let status = client.fetch_status(&url).await?;
    table.merge(&status);
    Ok(())
}
