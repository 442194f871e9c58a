//! api-smoke - sequential smoke tests for a REST inventory API
//!
//! Registers a user, logs in, creates a product, updates its quantity and
//! checks the listing, printing PASSED/FAILED per step.

use clap::Parser;
use api_smoke::{cli, commands, common};
use commands::Commands;

#[derive(Parser)]
#[command(name = "api-smoke", about = "Smoke-test a REST inventory API")]
#[command(version, long_about = None)]
struct Cli {
    /// Log runner and HTTP activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    common::logging::init_cli(cli.verbose);

    match cli::dispatch(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
