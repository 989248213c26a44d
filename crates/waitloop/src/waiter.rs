// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Wait coordinator.
//!
//! `Waiter` composes the gate, the timeout monitor, an action runner, and a
//! resolve-once cell into one blocking call that pumps the driving loop
//! until the cell resolves, tears down both timers on every exit path, and
//! returns an outcome that is never `Incomplete`.

use crate::cell::ResolveCell;
use crate::drive::DriveLoop;
use crate::gate::{self, WaitRecord};
use crate::monitor::{self, DEFAULT_GRACE_WINDOW};
use crate::outcome::{CheckError, WaitError, WaitOutcome};
use crate::runner::{self, Completion};
use crate::timer::TimerHandle;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Arc;
use std::time::Duration;

/// Synchronous waiting engine bound to the driving loop of the thread that
/// constructed it.
///
/// At most one wait may be active on a driving thread at a time; nested
/// waits panic with a diagnostic naming both call sites.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use waitloop::Waiter;
///
/// let waiter = Waiter::new();
/// let outcome = waiter.run_async(Duration::from_secs(1), |done| {
///     std::thread::spawn(move || done.complete(42));
/// });
/// assert_eq!(outcome.completed(), Some(42));
/// ```
pub struct Waiter {
    drive: Arc<DriveLoop>,
    grace: Duration,
}

impl Waiter {
    /// Create a waiter whose driving loop is owned by the current thread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            drive: Arc::new(DriveLoop::new()),
            grace: DEFAULT_GRACE_WINDOW,
        }
    }

    /// Override the stall-detection grace window: how long the driving loop
    /// gets to confirm a timeout before being declared stalled. The exact
    /// value only affects how quickly a stall is reported.
    #[must_use]
    pub fn with_grace_window(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Handle to the driving loop, for scheduling work the wait should
    /// observe (or that may congest it).
    #[must_use]
    pub fn drive(&self) -> Arc<DriveLoop> {
        Arc::clone(&self.drive)
    }

    /// Run one asynchronous action and capture its single result.
    ///
    /// `action` is invoked exactly once on the driving thread; the
    /// [`Completion`] it receives may be completed from any thread. A panic
    /// inside the action resolves the wait as `Failed`.
    #[track_caller]
    pub fn run_async<T, F>(&self, timeout: Duration, action: F) -> WaitOutcome<T>
    where
        T: Send + 'static,
        F: FnOnce(Completion<T>),
    {
        let record = WaitRecord {
            name: "run_async",
            location: Location::caller(),
        };
        let cell = Arc::new(ResolveCell::new());
        let completion = Completion::new(Arc::clone(&cell), self.drive());
        self.block_on(cell, timeout, record, move || {
            action(completion);
            None
        })
    }

    /// Poll `check` every `interval` until it yields a value.
    ///
    /// The first poll fires immediately, so a condition that already holds
    /// resolves without waiting one interval. An error from `check`
    /// resolves `Failed` with no retry.
    #[track_caller]
    pub fn poll_until<T, F>(&self, timeout: Duration, interval: Duration, check: F) -> WaitOutcome<T>
    where
        T: Send + 'static,
        F: FnMut() -> Result<Option<T>, CheckError> + Send + 'static,
    {
        let record = WaitRecord {
            name: "poll_until",
            location: Location::caller(),
        };
        let cell = Arc::new(ResolveCell::new());
        let drive = self.drive();
        let poll_cell = Arc::clone(&cell);
        self.block_on(cell, timeout, record, move || {
            Some(runner::arm_poll(interval, poll_cell, drive, check))
        })
    }

    /// The blocking core shared by both modes.
    ///
    /// State machine per wait: Admitted -> Running -> terminal. `start` arms
    /// the action runner and returns its timer registration, if any.
    fn block_on<T: Send + 'static>(
        &self,
        cell: Arc<ResolveCell<T>>,
        timeout: Duration,
        record: WaitRecord,
        start: impl FnOnce() -> Option<TimerHandle>,
    ) -> WaitOutcome<T> {
        let token = gate::admit(self.drive.owner(), record);
        log::debug!("[waiter] {} waiting up to {:?}", record, timeout);

        let timeout_timer =
            monitor::arm(timeout, self.grace, Arc::clone(&cell), self.drive());

        let mut poll_timer: Option<TimerHandle> = None;
        let pumped = panic::catch_unwind(AssertUnwindSafe(|| {
            poll_timer = start();
            while cell.is_incomplete() {
                self.drive.run();
            }
        }));

        // Teardown runs on every exit path: a leaked timer could fire into
        // a later wait's state.
        timeout_timer.cancel();
        if let Some(timer) = &poll_timer {
            timer.cancel();
        }
        drop(token);

        if let Err(payload) = pumped {
            if gate::precondition_tripped() {
                // Programmer misuse (nested wait), not a test-condition
                // result; re-raise after teardown.
                panic::resume_unwind(payload);
            }
            cell.try_resolve(WaitOutcome::Failed(WaitError::from_panic(payload)), || {});
        }

        let outcome = cell.take();
        log::debug!("[waiter] {} resolved: {}", record, outcome.label());
        debug_assert!(!outcome.is_incomplete(), "wait returned before resolution");
        outcome
    }
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new()
    }
}
