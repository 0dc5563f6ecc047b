//! webhands - autonomous browser agent.
//!
//! Main entry point for the webhands CLI.

mod cli;
mod console;
mod interaction;
mod session;

use clap::Parser;
use tracing::error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use webhands_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();
    let config_path = cli.config.clone();

    let result = match cli.into_command() {
        Commands::Run(args) => session::run(config_path.as_deref(), args).await,
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Console plus daily rolling file logs under `~/.webhands/logs`.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::app_dir()
        .ok_or("home directory not found")?
        .join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("webhands")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the file writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(())
}
