//! Runtime configuration
//!
//! Settings come from three places, highest priority first:
//! - command line flags, each with a `STATUSREP_*` environment fallback
//! - a TOML file (`--config`, or `statusrep.toml` in the working directory)
//! - built-in defaults

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_URL: &str = "http://storage.googleapis.com/revsreinterview/hosts";
pub const DEFAULT_CONFIG_FILE: &str = "statusrep.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Command line flags given at runtime.
#[derive(Debug, Default, Parser)]
#[command(
    name = "statusrep",
    version,
    about = "Generate reports for hosts with a status endpoint."
)]
pub struct Cli {
    /// Application log level (default: info)
    #[arg(short = 'l', long, env = "STATUSREP_LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format (default: text)
    #[arg(long, env = "STATUSREP_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// File containing the list of servers to query, one per line
    #[arg(short = 'f', long, env = "STATUSREP_HOSTS_FILE")]
    pub hosts_file: Option<PathBuf>,

    /// The root URL where host paths can be found. This URL will be prepended to all queries.
    #[arg(short = 'r', long, env = "STATUSREP_ROOT_URL")]
    pub root_url: Option<String>,

    /// Maximum number of hosts queried at once (default: unbounded)
    #[arg(long, env = "STATUSREP_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Optional TOML config file
    #[arg(short = 'c', long, env = "STATUSREP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Contents of `statusrep.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub hosts_file: Option<PathBuf>,
    pub root_url: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub max_concurrency: Option<usize>,
}

impl FileConfig {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub hosts_file: PathBuf,
    pub root_url: String,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub max_concurrency: Option<usize>,
}

impl Settings {
    /// Loads the config file (if any) and merges it under the flags.
    pub async fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let default_file = Path::new(DEFAULT_CONFIG_FILE);
        let file = match &cli.config {
            Some(path) => FileConfig::load(path).await?,
            None if default_file.exists() => FileConfig::load(default_file).await?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let hosts_file = cli
            .hosts_file
            .or(file.hosts_file)
            .ok_or(ConfigError::MissingHostsFile)?;

        Ok(Self {
            hosts_file,
            root_url: cli
                .root_url
                .or(file.root_url)
                .unwrap_or_else(|| DEFAULT_ROOT_URL.to_string()),
            log_level: cli.log_level.or(file.log_level).unwrap_or_default(),
            log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
            max_concurrency: cli.max_concurrency.or(file.max_concurrency),
        })
    }
}
