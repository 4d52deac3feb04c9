//! Rule engine CLI entry point

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, CommandRunner};
use rule_engine_core::{EngineConfig, FileRuleStore};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::load_or_default(&cli.config)?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());
    debug!(store = %store_path.display(), max_depth = config.max_depth, "configuration loaded");

    let runner = CommandRunner::new(config, FileRuleStore::new(store_path));
    runner.run(cli.command)
}
