//! statusrep - Generate reports for hosts with a status endpoint
//!
//! Reads the host list, queries every host's `/<host>/status` endpoint
//! concurrently and prints `<application>,<version>,<success rate>` lines
//! to stdout.

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use statusrep::config::{Cli, Settings};
use statusrep::error::ConfigError;
use statusrep::{hosts, logging, Poller};
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();

    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = match Settings::resolve(cli).await {
        Ok(settings) => settings,
        Err(ConfigError::MissingHostsFile) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "hosts file is required.")
            .exit(),
        Err(e) => return Err(e).context("Failed to load configuration"),
    };

    logging::init(settings.log_level, settings.log_format)?;
    info!(
        root_url = %settings.root_url,
        hosts_file = %settings.hosts_file.display(),
        "statusrep {} starting",
        env!("CARGO_PKG_VERSION")
    );

    let hosts = hosts::load_hosts(&settings.hosts_file)
        .await
        .context("unable to read in hosts")?;

    let poller = Poller::new(settings.max_concurrency);
    let mut stdout = std::io::stdout();
    let summary = poller
        .run(&hosts, &settings.root_url, &mut stdout)
        .await
        .context("Failed to write report")?;

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "report completed"
    );
    Ok(())
}
