// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Action runners: the side of the race that resolves on success.
//!
//! Single-shot mode hands the caller's action a [`Completion`] handle and
//! invokes the action once on the driving thread; the handle may be
//! completed from any thread. Polling mode ticks on a background timer and
//! posts the check onto the driving loop so the check always observes
//! driving-thread state.

use crate::cell::ResolveCell;
use crate::drive::DriveLoop;
use crate::outcome::{CheckError, WaitError, WaitOutcome};
use crate::timer::{self, TimerHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Completion handle for single-shot waits.
///
/// Cloneable and callable from any execution context. The first delivery
/// wins; later deliveries (and deliveries racing the timeout) are no-ops.
pub struct Completion<T> {
    cell: Arc<ResolveCell<T>>,
    drive: Arc<DriveLoop>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            drive: Arc::clone(&self.drive),
        }
    }
}

impl<T: Send + 'static> Completion<T> {
    pub(crate) fn new(cell: Arc<ResolveCell<T>>, drive: Arc<DriveLoop>) -> Self {
        Self { cell, drive }
    }

    /// Deliver the action's result and stop the driving loop.
    pub fn complete(&self, value: T) {
        let drive = Arc::clone(&self.drive);
        self.cell
            .try_resolve(WaitOutcome::Completed(value), move || drive.stop());
    }

    /// Report a failure from the action.
    pub fn fail(&self, error: CheckError) {
        let drive = Arc::clone(&self.drive);
        self.cell.try_resolve(
            WaitOutcome::Failed(WaitError::Raised(error)),
            move || drive.stop(),
        );
    }
}

/// Arm the polling runner.
///
/// A background timer ticks every `interval` (first tick immediate) and
/// posts the check onto the driving loop. An error resolves `Failed` with
/// no retry; a present value resolves `Completed` and stops the loop; an
/// absent value waits for the next tick.
pub(crate) fn arm_poll<T, F>(
    interval: Duration,
    cell: Arc<ResolveCell<T>>,
    drive: Arc<DriveLoop>,
    check: F,
) -> TimerHandle
where
    T: Send + 'static,
    F: FnMut() -> Result<Option<T>, CheckError> + Send + 'static,
{
    let check = Arc::new(Mutex::new(check));
    timer::periodic("poll", interval, move || {
        if !cell.is_incomplete() {
            return;
        }
        let cell = Arc::clone(&cell);
        let drive_handle = Arc::clone(&drive);
        let check = Arc::clone(&check);
        drive.post(move || {
            // Ticks can pile up behind a slow loop; only the live wait runs
            // its check.
            if !cell.is_incomplete() {
                return;
            }
            let mut check = check.lock();
            match (&mut *check)() {
                Ok(Some(value)) => {
                    let drive = Arc::clone(&drive_handle);
                    cell.try_resolve(WaitOutcome::Completed(value), move || drive.stop());
                }
                Ok(None) => {}
                Err(error) => {
                    log::debug!("[runner] poll check raised: {}", error);
                    let drive = Arc::clone(&drive_handle);
                    cell.try_resolve(
                        WaitOutcome::Failed(WaitError::Raised(error)),
                        move || drive.stop(),
                    );
                }
            }
        });
    })
}
