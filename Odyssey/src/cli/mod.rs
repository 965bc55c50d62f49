//! Odyssey CLI - Command-line interface for Odyssey model tools

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "odyssey")]
#[command(about = "Odyssey: binary model tools for KotOR and TSL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the Odyssey CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
