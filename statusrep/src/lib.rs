//! statusrep - usage report for a fleet of hosts exposing a status endpoint
//!
//! A run goes through three phases, each starting only once the previous one
//! is over:
//! - dispatch: one concurrent status query per host ([`fanout`])
//! - barrier: wait for every query to complete or fail
//! - report: one line per (application, version) with its success rate ([`report`])
//!
//! Hosts that fail (bad URL, transport error, undecodable body) are logged
//! and left out of the report; they never fail the run.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fanout;
pub mod hosts;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod state;

pub use client::{HostClient, HostStatus};
pub use error::{ConfigError, StatusError};
pub use fanout::{FanOut, HostFailure, PollOutcome};
pub use metrics::{AggregateMetric, AggregateTable, ApplicationKey};

use std::io::{self, Write};
use tracing::info;

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub report_lines: usize,
}

/// Polls hosts and writes the report.
#[derive(Clone, Debug)]
pub struct Poller {
    fan_out: FanOut,
}

impl Poller {
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self::with_client(HostClient::new(), max_concurrency)
    }

    pub fn with_client(client: HostClient, max_concurrency: Option<usize>) -> Self {
        Self {
            fan_out: FanOut::new(client).with_max_concurrency(max_concurrency),
        }
    }

    /// Dispatch, wait for every host, then write the report to `sink`.
    pub async fn run<W: Write>(
        &self,
        hosts: &[String],
        base_url: &str,
        sink: &mut W,
    ) -> io::Result<RunSummary> {
        let outcome = self.fan_out.poll_all(hosts, base_url).await;

        let entries = outcome.table.entries();
        let report_lines = report::write_report(&entries, sink)?;
        info!(lines = report_lines, "report written");

        Ok(RunSummary {
            attempted: outcome.attempted(),
            succeeded: outcome.succeeded,
            failed: outcome.failures.len() + outcome.aborted,
            report_lines,
        })
    }
}

/// Runs with default settings: unbounded concurrency, default HTTP client.
pub async fn run<W: Write>(hosts: &[String], base_url: &str, sink: &mut W) -> io::Result<RunSummary> {
    Poller::new(None).run(hosts, base_url, sink).await
}
