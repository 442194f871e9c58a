//! Sequential scenario runner
//!
//! Executes steps in declared order against the service, threading chain
//! state between them. A failed step whose produced value is required by a
//! later step stops the run; every other failure is recorded and the run
//! moves on.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::http::HttpClient;

use super::outcome::{ChainState, Outcome, OutcomeKind, StepOutput};

/// One HTTP interaction with a pass/fail expectation
#[async_trait]
pub trait Step: Send + Sync {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Chain state keys that must be present before this step can run
    fn requires(&self) -> &[&'static str] {
        &[]
    }

    /// Chain state key this step fills in when it passes
    fn produces(&self) -> Option<&'static str> {
        None
    }

    async fn execute(&self, state: &ChainState, client: &dyn HttpClient) -> StepOutput;
}

/// An ordered sequence of steps
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Box<dyn Step>>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    pub fn describe(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// The first step before `index` that produces `key`
    fn producer_before(&self, index: usize, key: &str) -> Option<&dyn Step> {
        self.steps[..index]
            .iter()
            .rev()
            .find(|s| s.produces() == Some(key))
            .map(|s| s.as_ref())
    }

    /// Whether any step after `index` requires `key`
    fn required_after(&self, index: usize, key: &str) -> bool {
        self.steps[index + 1..]
            .iter()
            .any(|s| s.requires().contains(&key))
    }
}

/// Why the run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The blocking step failed
    StepFailed,
    /// The blocking step passed but never supplied the value
    ValueMissing,
}

/// Short-circuit record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    /// Step whose missing output stopped the run
    pub blocking_step: String,
    /// The chain state key that later steps needed
    pub key: &'static str,
    pub reason: HaltReason,
}

/// Receives results as they happen
pub trait ReportSink {
    fn outcome(&mut self, outcome: &Outcome);
    fn halted(&mut self, halt: &Halt);
}

/// Discards everything
impl ReportSink for () {
    fn outcome(&mut self, _outcome: &Outcome) {}
    fn halted(&mut self, _halt: &Halt) {}
}

/// Result of a scenario run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub name: String,
    /// Outcomes of every executed step, in order
    pub outcomes: Vec<Outcome>,
    /// True when every step was executed
    pub completed: bool,
    pub halt: Option<Halt>,
    pub steps_total: usize,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.count(OutcomeKind::Passed)
    }

    /// Failed plus transport errors
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind() == kind).count()
    }

    /// Every step ran and passed
    pub fn success(&self) -> bool {
        self.completed && self.failed() == 0
    }
}

/// Run a scenario to completion or to the first short-circuit
pub async fn run_scenario(
    scenario: &Scenario,
    client: &dyn HttpClient,
    sink: &mut dyn ReportSink,
) -> RunReport {
    let steps_total = scenario.steps.len();
    let mut state = ChainState::new();
    let mut report = RunReport {
        name: scenario.name.clone(),
        outcomes: Vec::with_capacity(steps_total),
        completed: false,
        halt: None,
        steps_total,
    };

    info!(scenario = %scenario.name, steps = steps_total, "starting run");

    for (index, step) in scenario.steps.iter().enumerate() {
        if let Some(key) = step.requires().iter().copied().find(|k| !state.contains(k)) {
            let blocking = scenario
                .producer_before(index, key)
                .map(|s| s.name())
                .unwrap_or_else(|| step.name());
            let halt = Halt {
                blocking_step: blocking.to_string(),
                key,
                reason: HaltReason::ValueMissing,
            };
            warn!(step = %step.name(), key, "required value missing");
            sink.halted(&halt);
            report.halt = Some(halt);
            return report;
        }

        debug!(step = %step.name(), "executing step");
        let StepOutput { outcome, produced } = step.execute(&state, client).await;
        debug!(step = %step.name(), kind = ?outcome.kind(), "step finished");

        sink.outcome(&outcome);
        let passed = outcome.is_passed();
        report.outcomes.push(outcome);

        match (passed, step.produces()) {
            (true, Some(key)) => {
                if let Some(value) = produced {
                    state.insert(key, value);
                }
            }
            (false, Some(key)) if scenario.required_after(index, key) => {
                let halt = Halt {
                    blocking_step: step.name().to_string(),
                    key,
                    reason: HaltReason::StepFailed,
                };
                warn!(step = %step.name(), key, "dependency broken, stopping run");
                sink.halted(&halt);
                report.halt = Some(halt);
                return report;
            }
            _ => {}
        }
    }

    report.completed = true;
    info!(
        passed = report.passed(),
        failed = report.failed(),
        "run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ScriptedClient;
    use crate::testing::outcome::Failure;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Step with a fixed result that records which state it saw
    struct FixedStep {
        name: &'static str,
        requires: &'static [&'static str],
        produces: Option<&'static str>,
        pass: bool,
        value: Option<Value>,
        seen: Arc<Mutex<Vec<(String, ChainState)>>>,
    }

    impl FixedStep {
        fn new(name: &'static str, seen: &Arc<Mutex<Vec<(String, ChainState)>>>) -> Self {
            Self {
                name,
                requires: &[],
                produces: None,
                pass: true,
                value: None,
                seen: Arc::clone(seen),
            }
        }

        fn needs(mut self, keys: &'static [&'static str]) -> Self {
            self.requires = keys;
            self
        }

        fn gives(mut self, key: &'static str, value: Option<Value>) -> Self {
            self.produces = Some(key);
            self.value = value;
            self
        }

        fn failing(mut self) -> Self {
            self.pass = false;
            self
        }
    }

    #[async_trait]
    impl Step for FixedStep {
        fn name(&self) -> &str {
            self.name
        }

        fn requires(&self) -> &[&'static str] {
            self.requires
        }

        fn produces(&self) -> Option<&'static str> {
            self.produces
        }

        async fn execute(&self, state: &ChainState, _client: &dyn HttpClient) -> StepOutput {
            self.seen
                .lock()
                .unwrap()
                .push((self.name.to_string(), state.clone()));
            if self.pass {
                StepOutput {
                    outcome: Outcome::passed(self.name),
                    produced: self.value.clone(),
                }
            } else {
                Failure::new(self.name).expected(200, 500).into()
            }
        }
    }

    #[derive(Default)]
    struct Collect {
        events: Vec<String>,
    }

    impl ReportSink for Collect {
        fn outcome(&mut self, outcome: &Outcome) {
            self.events
                .push(format!("{}:{:?}", outcome.step(), outcome.kind()));
        }

        fn halted(&mut self, halt: &Halt) {
            self.events.push(format!("halt:{}", halt.blocking_step));
        }
    }

    fn seen() -> Arc<Mutex<Vec<(String, ChainState)>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_values_flow_to_later_steps() {
        let log = seen();
        let scenario = Scenario::new("flow")
            .step(FixedStep::new("login", &log).gives("token", Some(json!("t-1"))))
            .step(FixedStep::new("use", &log).needs(&["token"]));

        let report = run_scenario(&scenario, &ScriptedClient::new(), &mut ()).await;

        assert!(report.completed);
        assert!(report.success());
        let log = log.lock().unwrap();
        assert_eq!(log[1].0, "use");
        assert_eq!(log[1].1.get_str("token"), Some("t-1"));
    }

    #[tokio::test]
    async fn test_failed_producer_with_dependent_halts() {
        let log = seen();
        let scenario = Scenario::new("halt")
            .step(FixedStep::new("register", &log))
            .step(FixedStep::new("login", &log).gives("token", None).failing())
            .step(FixedStep::new("create", &log).needs(&["token"]));
        let mut sink = Collect::default();

        let report = run_scenario(&scenario, &ScriptedClient::new(), &mut sink).await;

        assert!(!report.completed);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(
            report.halt,
            Some(Halt {
                blocking_step: "login".to_string(),
                key: "token",
                reason: HaltReason::StepFailed,
            })
        );
        assert_eq!(
            sink.events,
            vec!["register:Passed", "login:Failed", "halt:login"]
        );
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_dependents_continues() {
        let log = seen();
        let scenario = Scenario::new("continue")
            .step(FixedStep::new("register", &log).failing())
            .step(FixedStep::new("update", &log).gives("quantity", None).failing())
            .step(FixedStep::new("list", &log));

        let report = run_scenario(&scenario, &ScriptedClient::new(), &mut ()).await;

        assert!(report.completed);
        assert!(!report.success());
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.halt, None);
    }

    #[tokio::test]
    async fn test_passed_producer_without_value_halts_before_consumer() {
        let log = seen();
        let scenario = Scenario::new("missing")
            .step(FixedStep::new("create", &log).gives("product_id", None))
            .step(FixedStep::new("update", &log).needs(&["product_id"]));
        let mut sink = Collect::default();

        let report = run_scenario(&scenario, &ScriptedClient::new(), &mut sink).await;

        assert!(!report.completed);
        assert_eq!(report.outcomes.len(), 1);
        let halt = report.halt.unwrap();
        assert_eq!(halt.blocking_step, "create");
        assert_eq!(halt.reason, HaltReason::ValueMissing);
        assert_eq!(sink.events, vec!["create:Passed", "halt:create"]);
    }

    #[tokio::test]
    async fn test_requirement_without_producer_names_the_step() {
        let log = seen();
        let scenario = Scenario::new("orphan")
            .step(FixedStep::new("list", &log).needs(&["token"]));

        let report = run_scenario(&scenario, &ScriptedClient::new(), &mut ()).await;

        assert!(report.outcomes.is_empty());
        assert_eq!(report.halt.unwrap().blocking_step, "list");
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_scenario_completes() {
        let report = run_scenario(&Scenario::new("empty"), &ScriptedClient::new(), &mut ()).await;
        assert!(report.completed);
        assert!(report.success());
        assert_eq!(report.steps_total, 0);
    }
}
