//! Console rendering of step outcomes
//!
//! Rendering is kept apart from the runner so reports can be checked as
//! plain strings. With `color` off the output is plain text; with it on,
//! only the markers are painted.

use colored::Colorize;

use super::outcome::{Failure, Outcome};
use super::runner::{Halt, HaltReason, ReportSink, RunReport};

/// Render one outcome as it appears on the console
///
/// A passed step is a single line. Failure details appear only when they
/// apply; an absent detail produces no line at all.
pub fn render_outcome(outcome: &Outcome, color: bool) -> String {
    match outcome {
        Outcome::Passed { step, note } => {
            let marker = paint("PASSED", color, |s| s.green().bold().to_string());
            match note {
                Some(note) => format!("{}: {}, {}", step, marker, note),
                None => format!("{}: {}", step, marker),
            }
        }
        Outcome::Failed(failure) => render_failure(failure, color),
        Outcome::TransportError {
            step,
            request,
            error,
        } => {
            let marker = paint("TRANSPORT ERROR", color, |s| s.yellow().bold().to_string());
            let mut lines = vec![format!("{}: {}", step, marker)];
            if let Some(payload) = request {
                lines.push(format!(" Request: {}", payload));
            }
            lines.push(format!(" Error: {}", error));
            lines.join("\n")
        }
    }
}

fn render_failure(failure: &Failure, color: bool) -> String {
    let marker = paint("FAILED", color, |s| s.red().bold().to_string());
    let mut lines = vec![format!("{}: {}", failure.step, marker)];

    if let Some(payload) = &failure.request {
        lines.push(format!(" Request: {}", payload));
    }
    if let Some(mismatch) = &failure.mismatch {
        lines.push(format!(
            " Expected: {}, Got: {}",
            mismatch.expected, mismatch.actual
        ));
    }
    if let Some(message) = &failure.message {
        lines.push(format!(" {}", message));
    }
    if let Some(body) = &failure.body {
        lines.push(format!(" Response Body: {}", body));
    }

    lines.join("\n")
}

/// Render the short-circuit notice
pub fn render_halt(halt: &Halt, color: bool) -> String {
    let text = match halt.reason {
        HaltReason::StepFailed => {
            format!("{} failed. Skipping further tests.", halt.blocking_step)
        }
        HaltReason::ValueMissing => format!(
            "{} did not provide '{}'. Skipping further tests.",
            halt.blocking_step, halt.key
        ),
    };
    paint(&text, color, |s| s.yellow().to_string())
}

/// Render the closing summary line
pub fn render_summary(report: &RunReport, color: bool) -> String {
    let mut text = format!("{} passed, {} failed", report.passed(), report.failed());
    if !report.completed {
        text.push_str(&format!(
            " (stopped early, {} of {} steps run)",
            report.outcomes.len(),
            report.steps_total
        ));
    }

    if report.success() {
        paint(&text, color, |s| s.green().bold().to_string())
    } else {
        paint(&text, color, |s| s.red().bold().to_string())
    }
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

/// Prints each result to stdout the moment it arrives
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl ReportSink for ConsoleSink {
    fn outcome(&mut self, outcome: &Outcome) {
        println!("{}", render_outcome(outcome, self.color));
    }

    fn halted(&mut self, halt: &Halt) {
        println!("{}", render_halt(halt, self.color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passed_is_a_single_line() {
        let text = render_outcome(&Outcome::passed("User Registration"), false);
        assert_eq!(text, "User Registration: PASSED");
    }

    #[test]
    fn test_passed_note_stays_on_the_marker_line() {
        let text = render_outcome(
            &Outcome::passed_with("Update Quantity", "Updated quantity: 15"),
            false,
        );
        assert_eq!(text, "Update Quantity: PASSED, Updated quantity: 15");
    }

    #[test]
    fn test_failed_with_every_detail() {
        let failure = Failure::new("User Registration")
            .request(Some(&json!({"username": "puja"})))
            .expected("201 or 409", 500)
            .body(r#"{"msg":"boom"}"#);

        let text = render_outcome(&failure.into(), false);
        assert_eq!(
            text,
            "User Registration: FAILED\n \
             Request: {\"username\":\"puja\"}\n \
             Expected: 201 or 409, Got: 500\n \
             Response Body: {\"msg\":\"boom\"}"
        );
    }

    #[test]
    fn test_absent_details_leave_no_lines() {
        let failure = Failure::new("Get Products").expected(200, 401).body("");
        let text = render_outcome(&failure.into(), false);
        assert_eq!(text, "Get Products: FAILED\n Expected: 200, Got: 401");
    }

    #[test]
    fn test_message_without_mismatch() {
        let failure = Failure::new("Get Products")
            .message("Could not find product named 'Phone'")
            .body("[]");
        let text = render_outcome(&failure.into(), false);
        assert_eq!(
            text,
            "Get Products: FAILED\n Could not find product named 'Phone'\n Response Body: []"
        );
    }

    #[test]
    fn test_transport_error() {
        let outcome = Outcome::TransportError {
            step: "Login Test".to_string(),
            request: None,
            error: "connection refused".to_string(),
        };
        assert_eq!(
            render_outcome(&outcome, false),
            "Login Test: TRANSPORT ERROR\n Error: connection refused"
        );
    }

    #[test]
    fn test_halt_notice() {
        let halt = Halt {
            blocking_step: "Login Test".to_string(),
            key: "token",
            reason: HaltReason::StepFailed,
        };
        assert_eq!(
            render_halt(&halt, false),
            "Login Test failed. Skipping further tests."
        );

        let halt = Halt {
            reason: HaltReason::ValueMissing,
            ..halt
        };
        assert_eq!(
            render_halt(&halt, false),
            "Login Test did not provide 'token'. Skipping further tests."
        );
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport {
            name: "smoke".to_string(),
            outcomes: vec![
                Outcome::passed("User Registration"),
                Failure::new("Login Test").expected(200, 401).into(),
            ],
            completed: false,
            halt: None,
            steps_total: 5,
        };
        assert_eq!(
            render_summary(&report, false),
            "1 passed, 1 failed (stopped early, 2 of 5 steps run)"
        );

        report.outcomes.pop();
        report.completed = true;
        report.steps_total = 1;
        assert_eq!(render_summary(&report, false), "1 passed, 0 failed");
    }
}
