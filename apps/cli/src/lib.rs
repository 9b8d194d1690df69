pub mod cli;
pub mod commands;
pub mod config;

use clap::Parser;
use srs_core::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

pub use crate::commands::execute;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if cli.min_one_day {
        config.settings.minimum_one_day = true;
    }
    tracing::debug!(store = %config.store_path.display(), "using collection");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &config, SystemClock, &mut out)
}
