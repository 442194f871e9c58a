//! CLI command definitions
//!
//! Defines the clap commands for the smoke-test CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the smoke-test scenario against the service
    Run(RunArgs),

    /// List the scenario's steps and the values they pass along
    Steps {
        /// Path to a YAML scenario file (defaults to the built-in scenario)
        #[arg(long, short)]
        scenario: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a YAML scenario file (defaults to the built-in scenario)
    #[arg(long, short)]
    pub scenario: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root URL of the service, e.g. http://localhost:8080/api
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Username for the register and login steps
    #[arg(long)]
    pub username: Option<String>,

    /// Password for the register and login steps
    #[arg(long)]
    pub password: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
