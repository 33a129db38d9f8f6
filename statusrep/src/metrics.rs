//! Per-application metric aggregation
//!
//! Every host that answers contributes its counters to one shared
//! [`AggregateTable`], bucketed by [`ApplicationKey`]:
//! - merges are pure additions, so totals do not depend on arrival order
//! - the whole read-modify-write of a merge runs under a single lock
//! - the table is only read for reporting once the fan-out has joined

use crate::client::HostStatus;
use crate::state::{new_state, Shared};
use std::collections::HashMap;

/// A single version of a particular application.
///
/// Empty name or version are legal and form their own bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApplicationKey {
    pub name: String,
    pub version: String,
}

impl ApplicationKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl From<&HostStatus> for ApplicationKey {
    fn from(status: &HostStatus) -> Self {
        Self::new(status.application.as_str(), status.version.as_str())
    }
}

/// Running totals for one [`ApplicationKey`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateMetric {
    pub total_requests_count: u64,
    pub total_success_count: u64,
    pub total_error_count: u64,
}

impl AggregateMetric {
    /// Adds one host's counters. Totals saturate instead of wrapping.
    pub fn add(&mut self, status: &HostStatus) {
        self.total_requests_count = self.total_requests_count.saturating_add(status.requests_count);
        self.total_success_count = self.total_success_count.saturating_add(status.success_count);
        self.total_error_count = self.total_error_count.saturating_add(status.error_count);
    }

    /// `success / requests`, or 0 when either count is 0.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests_count == 0 || self.total_success_count == 0 {
            return 0.0;
        }
        self.total_success_count as f64 / self.total_requests_count as f64
    }
}

/// Shared mapping from [`ApplicationKey`] to [`AggregateMetric`].
///
/// Clones are handles onto the same table.
#[derive(Clone, Debug)]
pub struct AggregateTable {
    apps: Shared<HashMap<ApplicationKey, AggregateMetric>>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self {
            apps: new_state(HashMap::new()),
        }
    }

    /// Adds the status counters to the entry for its application, creating
    /// the entry on first sight.
    pub fn merge(&self, status: &HostStatus) {
        let key = ApplicationKey::from(status);
        let mut apps = self.apps.lock();
        apps.entry(key).or_default().add(status);
    }

    pub fn get(&self, key: &ApplicationKey) -> Option<AggregateMetric> {
        self.apps.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.apps.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.lock().is_empty()
    }

    /// Snapshot of all entries, sorted by application name then version.
    pub fn entries(&self) -> Vec<(ApplicationKey, AggregateMetric)> {
        let mut entries: Vec<_> = self
            .apps
            .lock()
            .iter()
            .map(|(key, metric)| (key.clone(), *metric))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for AggregateTable {
    fn default() -> Self {
        Self::new()
    }
}
