// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Outcome mapping for assertion layers.
//!
//! Matcher code consumes the engine through a boolean polling call and a
//! small status type: `Satisfied` maps to pass, everything else to fail
//! with a mode-specific message, so a developer can tell "my condition
//! never became true" from "the environment couldn't even measure the
//! timeout" from "my code crashed".

use crate::outcome::{CheckError, WaitError, WaitOutcome};
use crate::waiter::Waiter;
use std::time::Duration;

/// Result of polling a boolean expression.
#[derive(Debug)]
pub enum PollStatus {
    /// The expression became true before the timeout.
    Satisfied,
    /// The expression never became true.
    Unsatisfied,
    /// The driving loop was too congested for the timeout measurement to
    /// be trusted.
    StalledLoop,
    /// The expression raised an error or panicked.
    Raised(WaitError),
}

impl PollStatus {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollStatus::Satisfied)
    }

    /// Mode-specific failure message; `None` when satisfied.
    #[must_use]
    pub fn failure_message(&self, timeout: Duration) -> Option<String> {
        match self {
            PollStatus::Satisfied => None,
            PollStatus::Unsatisfied => Some(format!(
                "Waited more than {:.1} seconds",
                timeout.as_secs_f64()
            )),
            PollStatus::StalledLoop => Some(
                "Stall on driving thread - too much enqueued on the loop before the wait could execute".to_string(),
            ),
            PollStatus::Raised(err) => Some(format!("Unexpected failure while waiting: {}", err)),
        }
    }
}

/// Poll a boolean expression until it holds.
///
/// Convenience wrapper over [`Waiter::poll_until`] for assertion layers
/// that only care whether a predicate became true.
#[track_caller]
pub fn poll_expression<F>(
    waiter: &Waiter,
    timeout: Duration,
    interval: Duration,
    mut expression: F,
) -> PollStatus
where
    F: FnMut() -> Result<bool, CheckError> + Send + 'static,
{
    let outcome = waiter.poll_until(timeout, interval, move || match expression() {
        Ok(true) => Ok(Some(())),
        Ok(false) => Ok(None),
        Err(err) => Err(err),
    });

    match outcome {
        WaitOutcome::Completed(()) => PollStatus::Satisfied,
        WaitOutcome::TimedOut => PollStatus::Unsatisfied,
        WaitOutcome::StalledLoop => PollStatus::StalledLoop,
        WaitOutcome::Failed(err) => PollStatus::Raised(err),
        // `wait` never returns Incomplete; reaching this is an engine bug.
        WaitOutcome::Incomplete => unreachable!("wait returned Incomplete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_has_no_failure_message() {
        assert!(PollStatus::Satisfied.is_satisfied());
        assert_eq!(
            PollStatus::Satisfied.failure_message(Duration::from_secs(1)),
            None
        );
    }

    #[test]
    fn unsatisfied_reports_the_timeout() {
        let message = PollStatus::Unsatisfied
            .failure_message(Duration::from_millis(1500))
            .expect("message");
        assert_eq!(message, "Waited more than 1.5 seconds");
    }

    #[test]
    fn stall_and_raise_messages_are_distinct() {
        let stall = PollStatus::StalledLoop
            .failure_message(Duration::from_secs(1))
            .expect("message");
        let raised = PollStatus::Raised(WaitError::Panicked("boom".into()))
            .failure_message(Duration::from_secs(1))
            .expect("message");
        assert!(stall.contains("Stall on driving thread"));
        assert!(raised.contains("boom"));
        assert_ne!(stall, raised);
    }

    #[test]
    fn expression_polling_end_to_end() {
        let waiter = Waiter::new();
        let mut calls = 0;
        let status = poll_expression(
            &waiter,
            Duration::from_secs(2),
            Duration::from_millis(5),
            move || {
                calls += 1;
                Ok(calls >= 3)
            },
        );
        assert!(status.is_satisfied());
    }
}
