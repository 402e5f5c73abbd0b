//! Runs the scripted package session.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use pouch_core::PouchConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CONFIG_PATH: &str = "pouch_config.json5";

fn main() -> anyhow::Result<()> {
    let path = env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_PATH), PathBuf::from);
    let config = PouchConfig::load_or_create(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    setup_logging(&config)?;

    let character = pouch::demo::run(&config)?;
    tracing::info!(
        owner = %character.id(),
        normal_empty = character.normal().empty_count(),
        store_empty = character.store().empty_count(),
        "Session finished"
    );
    Ok(())
}

fn setup_logging(config: &PouchConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()?;
    Ok(())
}
