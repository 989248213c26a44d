// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! # waitloop - synchronous waiting engine for asynchronous expectations
//!
//! `waitloop` lets test code block the thread that owns a cooperative
//! driving loop until an asynchronous condition resolves, bounds the wait
//! with a timeout, and detects when the loop itself is too congested for
//! the timeout measurement to be trusted.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use waitloop::{Waiter, WaitOutcome};
//!
//! let waiter = Waiter::new();
//!
//! // Single-shot: run one async action, capture its result.
//! let outcome = waiter.run_async(Duration::from_secs(1), |done| {
//!     std::thread::spawn(move || done.complete("hello"));
//! });
//! assert_eq!(outcome.completed(), Some("hello"));
//!
//! // Polling: check a condition every 10ms until it yields a value.
//! let outcome = waiter.poll_until(
//!     Duration::from_secs(1),
//!     Duration::from_millis(10),
//!     || Ok(Some(42)),
//! );
//! assert!(matches!(outcome, WaitOutcome::Completed(42)));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller (driving thread)
//!   +-- Waiter::run_async / poll_until
//!        +-- gate       admits one wait per driving thread
//!        +-- monitor    timeout timer on a background thread,
//!        |              stall detection via grace-window handshake
//!        +-- runner     single-shot Completion / polling ticks
//!        +-- cell       exactly-once resolution, winner stops the loop
//!        +-- drive      cooperative task queue pumped until resolved
//! ```
//!
//! Timeout monitor and action runner race to resolve one shared
//! resolve-once cell per wait; whichever wins determines the
//! [`WaitOutcome`]. The loser's attempt is silently dropped and both timer
//! registrations are cancelled on every exit path.
//!
//! ## Outcomes
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | [`WaitOutcome::Completed`] | the action produced a value |
//! | [`WaitOutcome::TimedOut`] | the timeout elapsed first |
//! | [`WaitOutcome::StalledLoop`] | the loop never confirmed the timeout |
//! | [`WaitOutcome::Failed`] | user code errored or panicked |
//!
//! Nested waits and waits from a non-owning thread are programmer misuse
//! and panic immediately instead of resolving an outcome.

mod cell;
mod gate;
mod monitor;
mod runner;
mod timer;

/// Cooperative driving loop pumped by the coordinator.
pub mod drive;
/// Terminal states and user-code failure types.
pub mod outcome;
/// Outcome-to-status mapping for assertion layers.
pub mod report;
/// The wait coordinator.
pub mod waiter;

pub use drive::DriveLoop;
pub use monitor::DEFAULT_GRACE_WINDOW;
pub use outcome::{CheckError, WaitError, WaitOutcome};
pub use report::{poll_expression, PollStatus};
pub use runner::Completion;
pub use waiter::Waiter;
