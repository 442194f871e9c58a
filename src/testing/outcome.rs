//! Step outcomes and the values threaded between steps

use std::collections::BTreeMap;

use serde_json::Value;

/// Chain state keys
pub mod keys {
    /// Bearer token from a successful login
    pub const TOKEN: &str = "token";
    /// Identifier of the product created by the scenario
    pub const PRODUCT_ID: &str = "product_id";
    /// Quantity reported back by the update endpoint
    pub const QUANTITY: &str = "quantity";
}

/// Values produced by earlier steps for later ones
#[derive(Debug, Default, Clone)]
pub struct ChainState {
    values: BTreeMap<&'static str, Value>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: Value) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Outcome category, for counting and matching without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Passed,
    Failed,
    TransportError,
}

/// Expected vs. actual descriptor pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: String,
}

/// Details of a failed step
///
/// Every field is optional and is left out of the report when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub step: String,
    /// Payload the step sent
    pub request: Option<Value>,
    pub mismatch: Option<Mismatch>,
    /// Free-form explanation when there is no expected/actual pair
    pub message: Option<String>,
    /// Raw response body; never `Some("")`
    pub body: Option<String>,
}

impl Failure {
    pub fn new(step: &str) -> Self {
        Self {
            step: step.to_string(),
            request: None,
            mismatch: None,
            message: None,
            body: None,
        }
    }

    pub fn request(mut self, payload: Option<&Value>) -> Self {
        self.request = payload.cloned();
        self
    }

    pub fn expected(mut self, expected: impl ToString, actual: impl ToString) -> Self {
        self.mismatch = Some(Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the response body, dropping it if empty
    pub fn body(mut self, body: &str) -> Self {
        self.body = if body.trim().is_empty() {
            None
        } else {
            Some(body.to_string())
        };
        self
    }
}

/// Recorded result of executing one step
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed {
        step: String,
        /// Informational detail shown after the PASSED marker
        note: Option<String>,
    },
    Failed(Failure),
    /// The service could not be reached at all
    TransportError {
        step: String,
        request: Option<Value>,
        error: String,
    },
}

impl Outcome {
    pub fn passed(step: &str) -> Self {
        Outcome::Passed {
            step: step.to_string(),
            note: None,
        }
    }

    pub fn passed_with(step: &str, note: impl Into<String>) -> Self {
        Outcome::Passed {
            step: step.to_string(),
            note: Some(note.into()),
        }
    }

    pub fn step(&self) -> &str {
        match self {
            Outcome::Passed { step, .. } => step,
            Outcome::Failed(failure) => &failure.step,
            Outcome::TransportError { step, .. } => step,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Passed { .. } => OutcomeKind::Passed,
            Outcome::Failed(_) => OutcomeKind::Failed,
            Outcome::TransportError { .. } => OutcomeKind::TransportError,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.kind() == OutcomeKind::Passed
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Outcome::Failed(failure)
    }
}

/// What a step hands back to the runner
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub outcome: Outcome,
    /// Value for the step's produced key; only used when the step passed
    pub produced: Option<Value>,
}

impl StepOutput {
    pub fn new(outcome: impl Into<Outcome>) -> Self {
        Self {
            outcome: outcome.into(),
            produced: None,
        }
    }

    pub fn producing(outcome: impl Into<Outcome>, value: Value) -> Self {
        Self {
            outcome: outcome.into(),
            produced: Some(value),
        }
    }
}

impl From<Outcome> for StepOutput {
    fn from(outcome: Outcome) -> Self {
        Self::new(outcome)
    }
}

impl From<Failure> for StepOutput {
    fn from(failure: Failure) -> Self {
        Self::new(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_omitted() {
        let failure = Failure::new("Get Products").body("");
        assert_eq!(failure.body, None);

        let failure = Failure::new("Get Products").body("   ");
        assert_eq!(failure.body, None);

        let failure = Failure::new("Get Products").body("[]");
        assert_eq!(failure.body.as_deref(), Some("[]"));
    }

    #[test]
    fn test_outcome_accessors() {
        let passed = Outcome::passed("Login Test");
        assert_eq!(passed.step(), "Login Test");
        assert!(passed.is_passed());

        let failed: Outcome = Failure::new("Add Product").expected(201, 500).into();
        assert_eq!(failed.kind(), OutcomeKind::Failed);
        assert_eq!(failed.step(), "Add Product");

        let transport = Outcome::TransportError {
            step: "User Registration".to_string(),
            request: None,
            error: "connection refused".to_string(),
        };
        assert_eq!(transport.kind(), OutcomeKind::TransportError);
        assert!(!transport.is_passed());
    }

    #[test]
    fn test_chain_state() {
        let mut state = ChainState::new();
        assert!(!state.contains(keys::TOKEN));

        state.insert(keys::TOKEN, json!("abc"));
        state.insert(keys::QUANTITY, json!(15));

        assert_eq!(state.get_str(keys::TOKEN), Some("abc"));
        assert_eq!(state.get_str(keys::QUANTITY), None);
        assert_eq!(state.get(keys::QUANTITY), Some(&json!(15)));
    }
}
