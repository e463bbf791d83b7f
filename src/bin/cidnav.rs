//! Cidnav CLI Binary
//!
//! Command-line interface for browsing and editing a content-addressed store.

use anyhow::Context;
use cidnav::logging::init_logging;
use cidnav::tooling::cli::{load_config, logging_config, Cli, CliContext};
use clap::Parser;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("Error loading configuration")?;
    init_logging(Some(&logging_config(&cli, &config))).context("Error initializing logging")?;

    let context = CliContext::new(config, cli.store.clone()).context("Error opening store")?;
    let output = context.execute(&cli.command).await?;
    println!("{}", output);
    Ok(())
}
