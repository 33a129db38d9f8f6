//! Logging setup
//!
//! Logs go to stderr so the report on stdout stays machine readable.
//! `RUST_LOG`, when set, takes precedence over the configured level.

use crate::config::{LogFormat, LogLevel};
use anyhow::{anyhow, Result};
use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

impl LogLevel {
    /// Filter directive for this level. There is no fatal level in
    /// `tracing`, so `fatal` keeps errors only.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

pub fn init(level: LogLevel, format: LogFormat) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(level, format))
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// Stderr subscriber for `level` and `format`, not yet installed.
pub fn subscriber(level: LogLevel, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directives() {
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
        assert_eq!(LogLevel::Fatal.as_directive(), "error");
    }

    #[test]
    fn test_subscriber_is_scoped() {
        for format in [LogFormat::Text, LogFormat::Json] {
            tracing::subscriber::with_default(subscriber(LogLevel::Warn, format), || {
                tracing::warn!("scoped subscriber");
            });
        }
    }
}
