//! Scenario runner
//!
//! Executes an ordered list of dependent HTTP steps against the service,
//! stops early when a step that later steps depend on fails, and reports
//! every executed step as structured data. Console rendering lives in
//! [`report`] so the runner can be asserted on directly.

mod config;
pub mod outcome;
pub mod report;
mod runner;
pub mod steps;

pub use config::*;
pub use outcome::{keys, ChainState, Failure, Mismatch, Outcome, OutcomeKind, StepOutput};
pub use runner::{run_scenario, Halt, HaltReason, ReportSink, RunReport, Scenario, Step};
pub use steps::build_scenario;
