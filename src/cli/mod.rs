//! CLI command handling
//!
//! Resolves configuration, runs the scenario, and prints the report.

use std::io::IsTerminal;

use colored::Colorize;
use tracing::debug;

use crate::commands::{Commands, RunArgs};
use crate::common::config::{Config, Credentials};
use crate::common::Result;
use crate::http::ServiceClient;
use crate::testing::report::{render_summary, ConsoleSink};
use crate::testing::{build_scenario, run_scenario, TestScenario};

/// Dispatch a CLI command
///
/// Returns whether everything the command checked passed.
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run(args) => run(args).await,
        Commands::Steps { scenario } => {
            let fixture = match scenario {
                Some(path) => TestScenario::load(&path)?,
                None => TestScenario::default(),
            };
            print_steps(&fixture);
            Ok(true)
        }
    }
}

async fn run(args: RunArgs) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut fixture = match &args.scenario {
        Some(path) => TestScenario::load(path)?,
        None => TestScenario::default(),
    };
    fixture.credentials = Some(resolve_credentials(&args, &config, &fixture));

    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.target.base_url.clone());
    let timeout = args.timeout.unwrap_or(config.http.timeout_secs);
    debug!(%base_url, timeout, "resolved target");

    let client = ServiceClient::new(&base_url, timeout, &config.http.user_agent)?;
    let scenario = build_scenario(&fixture);
    let color = !args.no_color && std::io::stdout().is_terminal();

    if color {
        println!(
            "\n{} {}",
            "Running Test:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        println!("  {}\n", base_url.dimmed());
    } else {
        println!("\nRunning Test: {}", scenario.name);
        if let Some(desc) = &scenario.description {
            println!("  {}", desc);
        }
        println!("  {}\n", base_url);
    }

    let mut sink = ConsoleSink::new(color);
    let report = run_scenario(&scenario, &client, &mut sink).await;

    println!("\n{}\n", render_summary(&report, color));

    Ok(report.success())
}

/// CLI flags win over the scenario file, which wins over the config file
fn resolve_credentials(args: &RunArgs, config: &Config, fixture: &TestScenario) -> Credentials {
    let base = fixture
        .credentials
        .clone()
        .or_else(|| config.credentials.clone())
        .unwrap_or_default();

    Credentials {
        username: args.username.clone().unwrap_or(base.username),
        password: args.password.clone().unwrap_or(base.password),
    }
}

fn print_steps(fixture: &TestScenario) {
    let scenario = build_scenario(fixture);
    println!("{}", scenario.name);
    if let Some(desc) = &scenario.description {
        println!("  {}", desc);
    }
    println!();

    for (i, step) in scenario.steps.iter().enumerate() {
        let requires = if step.requires().is_empty() {
            "-".to_string()
        } else {
            step.requires().join(", ")
        };
        let produces = step.produces().unwrap_or("-");
        println!(
            "  {}. {:<18} requires: {:<20} produces: {}",
            i + 1,
            step.name(),
            requires,
            produces
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_credentials_default_when_unset() {
        let resolved = resolve_credentials(
            &RunArgs::default(),
            &Config::default(),
            &TestScenario::default(),
        );
        assert_eq!(resolved, Credentials::default());
    }

    #[test]
    fn test_credentials_precedence() {
        let config = Config {
            credentials: Some(creds("from-config", "c")),
            ..Config::default()
        };
        let mut fixture = TestScenario::default();

        let resolved = resolve_credentials(&RunArgs::default(), &config, &fixture);
        assert_eq!(resolved, creds("from-config", "c"));

        fixture.credentials = Some(creds("from-scenario", "s"));
        let resolved = resolve_credentials(&RunArgs::default(), &config, &fixture);
        assert_eq!(resolved, creds("from-scenario", "s"));

        let args = RunArgs {
            username: Some("from-flag".to_string()),
            ..RunArgs::default()
        };
        let resolved = resolve_credentials(&args, &config, &fixture);
        assert_eq!(resolved, creds("from-flag", "s"));
    }
}
