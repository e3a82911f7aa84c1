//! Shoal CLI - Command-line interface
//!
//! Runs the catalog API server and offers one-shot access to the List and
//! Sample operations for scripting and debugging.

mod commands;

use clap::Parser;
use shoal_core::tracing_setup::{CliLogLevel, init_console_tracing, init_tracing};

#[derive(Parser)]
#[command(name = "shoal")]
#[command(about = "Content catalog service with paginated listing and exclusion sampling")]
#[command(version)]
struct Cli {
    /// Console log level (RUST_LOG overrides it)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Info, global = true)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = cli.log_level.as_tracing_level();

    if cli.command.is_long_running() {
        init_tracing(level, None)?;
    } else {
        init_console_tracing(level)?;
    }

    commands::handle_command(cli.command).await
}
