//! Activity Log Worker
//!
//! Composition root for the activity log: connects to MongoDB, ensures the
//! indexes and keeps the daily retention purge running until interrupted.
//! Can also run a single purge and exit.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::{Result, WrapErr};
use tracing::info;

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "activity-log-worker")]
#[command(about = "Keep login and action events within their retention window")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scheduled purge until Ctrl-C (default)
    Run,

    /// Run one purge now and exit
    Purge {
        /// Override the configured retention window (at least 1 day)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        retention_days: Option<u32>,
    },

    /// Check MongoDB connectivity and exit
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let log = domain_activity_log::init(&config.activity_log)
        .await
        .wrap_err("Failed to initialize activity log")?;

    let outcome = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            if let Ok(Some(next)) = log.scheduler().next_run().await {
                info!(%next, "Waiting for scheduled purge");
            }
            tokio::signal::ctrl_c()
                .await
                .map(|()| info!("Shutdown signal received"))
                .wrap_err("Failed to listen for shutdown signal")
        }

        Commands::Purge { retention_days } => {
            let days = retention_days.unwrap_or(config.activity_log.retention_days);
            log.scheduler()
                .purge(days)
                .await
                .map(|report| {
                    println!(
                        "Purged {} login events and {} action events older than {}",
                        report.login_events, report.action_events, report.cutoff
                    );
                })
                .wrap_err("Purge failed")
        }

        Commands::Health => {
            let status = log.health().await;
            println!(
                "healthy={} latency_ms={} message={}",
                status.healthy,
                status.response_time_ms,
                status.message.as_deref().unwrap_or("-")
            );
            Ok(())
        }
    };

    domain_activity_log::shutdown().await;
    outcome
}
