//! Error types
//!
//! `StatusError` covers everything that can go wrong while polling a single
//! host. None of its variants is fatal to a run: the fan-out logs them and
//! moves on. `ConfigError` is raised while resolving settings for the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while polling one host.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("unable to build status URL from '{base}': {reason}")]
    UrlConstruction { base: String, reason: String },

    #[error("unable to get status for '{url}': {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to unmarshal status response body: '{url}': {source}")]
    Unmarshal {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StatusError {
    /// Error category, used as the `kind` field of log events.
    pub fn kind(&self) -> &'static str {
        match self {
            StatusError::UrlConstruction { .. } => "url_construction",
            StatusError::Request { .. } => "request",
            StatusError::Unmarshal { .. } => "unmarshal",
        }
    }

    pub(crate) fn url_construction(base: &str, reason: impl ToString) -> Self {
        StatusError::UrlConstruction {
            base: base.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("hosts file is required.")]
    MissingHostsFile,

    #[error("unable to read config file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
