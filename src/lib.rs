//! api-smoke - sequential smoke tests for a REST inventory API
//!
//! This library provides the scenario runner, the inventory API steps, and
//! the HTTP client capability they talk through.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{run_scenario, Outcome, RunReport, Scenario, TestScenario};
