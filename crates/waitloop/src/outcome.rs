// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Terminal states of a wait.
//!
//! Every wait resolves to exactly one [`WaitOutcome`]. `Incomplete` exists
//! only while the wait is in flight; a caller never observes it after
//! `wait` returns.

use std::any::Any;
use std::fmt;

/// Boxed error returned by a user-supplied check or action.
pub type CheckError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure captured from user code while a wait was in flight.
#[derive(Debug)]
pub enum WaitError {
    /// The check or action returned an error.
    Raised(CheckError),
    /// User code panicked while the wait was pumping the driving loop.
    Panicked(String),
}

impl WaitError {
    /// Convert a payload caught by `catch_unwind` into a `WaitError`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        WaitError::Panicked(message)
    }
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Raised(err) => write!(f, "check raised an error: {}", err),
            WaitError::Panicked(msg) => write!(f, "panicked while waiting: {}", msg),
        }
    }
}

impl std::error::Error for WaitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WaitError::Raised(err) => Some(err.as_ref()),
            WaitError::Panicked(_) => None,
        }
    }
}

/// Outcome of one wait.
#[derive(Debug)]
pub enum WaitOutcome<T> {
    /// No terminal state yet. Never observable after `wait` returns.
    Incomplete,
    /// The timeout elapsed before the action resolved.
    TimedOut,
    /// The driving loop failed to service the timeout confirmation within
    /// the grace window, so the timeout measurement itself is unreliable.
    ///
    /// This usually means other scheduled work monopolized the loop and the
    /// waited-on code may never have run at all.
    StalledLoop,
    /// The action produced a value.
    Completed(T),
    /// The action raised an error or panicked.
    Failed(WaitError),
}

impl<T> WaitOutcome<T> {
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, WaitOutcome::Incomplete)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, WaitOutcome::Completed(_))
    }

    /// Extract the completed value, if any.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            WaitOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Short name for logging without requiring `T: Debug`.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            WaitOutcome::Incomplete => "incomplete",
            WaitOutcome::TimedOut => "timed-out",
            WaitOutcome::StalledLoop => "stalled-loop",
            WaitOutcome::Completed(_) => "completed",
            WaitOutcome::Failed(_) => "failed",
        }
    }
}
