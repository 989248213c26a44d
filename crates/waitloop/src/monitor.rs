// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Timeout monitor with stalled-loop detection.
//!
//! The monitor guarantees a wait terminates even if the action never
//! resolves, and it distinguishes "the condition timed out" from "the
//! driving loop was too busy for the timeout measurement to be trusted".
//!
//! The timeout cannot simply resolve the cell from its own thread: the
//! winning side effect (stopping the driving loop) has to run on the loop
//! itself, and whether that handoff succeeds is exactly the liveness signal
//! we need. So the fire path is a two-step handshake:
//!
//! 1. post a confirmation block onto the driving loop and interrupt the
//!    pass the loop is currently blocked in;
//! 2. give the loop a grace window to actually run the block. If it does,
//!    the block resolves `TimedOut` on the driving thread. If the window
//!    elapses unconfirmed, the loop is presumed stalled on unrelated work
//!    and the monitor resolves `StalledLoop` from its own thread.
//!
//! Two bounded(1) channels arbitrate the race between those steps. `guard`
//! starts holding one token; whoever takes it decides the outcome, and the
//! posted block takes priority whenever it runs inside the window. This
//! estimation is racy by construction (it is probing whether a cooperative
//! loop is live), but collapsing the two steps would conflate the two
//! outcomes.

use crate::cell::ResolveCell;
use crate::drive::DriveLoop;
use crate::outcome::WaitOutcome;
use crate::timer::{self, TimerHandle};
use crossbeam::channel::bounded;
use std::sync::Arc;
use std::time::Duration;

/// How long the driving loop gets to confirm a timeout before being
/// declared stalled. Heuristic; configurable via
/// [`Waiter::with_grace_window`](crate::Waiter::with_grace_window).
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_millis(500);

/// Arm the timeout for one wait. The returned handle must be cancelled on
/// every exit path. A zero timeout fires immediately.
pub(crate) fn arm<T: Send + 'static>(
    timeout: Duration,
    grace: Duration,
    cell: Arc<ResolveCell<T>>,
    drive: Arc<DriveLoop>,
) -> TimerHandle {
    log::trace!("[monitor] arming timeout timer for {:?}", timeout);
    timer::oneshot("timeout", timeout, move || fire(grace, &cell, &drive))
}

fn fire<T: Send + 'static>(grace: Duration, cell: &Arc<ResolveCell<T>>, drive: &Arc<DriveLoop>) {
    if !cell.is_incomplete() {
        // The action won the race before the timer fired.
        return;
    }
    log::debug!("[monitor] timeout fired, handing confirmation to the driving loop");

    let (confirm_tx, confirm_rx) = bounded::<()>(1);
    let (guard_tx, guard_rx) = bounded::<()>(1);
    let _ = guard_tx.try_send(());

    {
        let cell = Arc::clone(cell);
        let drive_handle = Arc::clone(drive);
        let guard_rx = guard_rx.clone();
        drive.post(move || {
            // Driving thread. Taking the guard token means we ran inside
            // the grace window; the token goes straight back so the monitor
            // can still observe that confirmation happened.
            if guard_rx.try_recv().is_ok() {
                let _ = confirm_tx.try_send(());
                let _ = guard_tx.try_send(());
                log::debug!("[monitor] driving loop confirmed the timeout");
                cell.try_resolve(WaitOutcome::TimedOut, || drive_handle.stop());
            }
        });
    }

    // Interrupt whatever pass the loop is blocked in so the posted block
    // gets a chance to run, then wait out the grace window.
    drive.stop();

    let confirmed = confirm_rx.recv_timeout(grace).is_ok();
    if !confirmed && guard_rx.try_recv().is_ok() {
        log::debug!(
            "[monitor] no confirmation within {:?}, driving loop presumed stalled",
            grace
        );
        let drive_handle = Arc::clone(drive);
        cell.try_resolve(WaitOutcome::StalledLoop, move || drive_handle.stop());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn fire_on_resolved_cell_is_a_no_op() {
        let cell = Arc::new(ResolveCell::new());
        let drive = Arc::new(DriveLoop::new());
        cell.try_resolve(WaitOutcome::Completed(1), || {});

        fire(Duration::from_millis(50), &cell, &drive);
        assert_eq!(cell.take().completed(), Some(1));
    }

    #[test]
    fn serviced_loop_resolves_timed_out() {
        let cell: Arc<ResolveCell<u32>> = Arc::new(ResolveCell::new());
        let drive = Arc::new(DriveLoop::new());

        let monitor_cell = Arc::clone(&cell);
        let monitor_drive = Arc::clone(&drive);
        let monitor = thread::spawn(move || {
            fire(Duration::from_millis(300), &monitor_cell, &monitor_drive);
        });

        // Pump the loop the way the coordinator does.
        while cell.is_incomplete() {
            drive.run();
        }
        monitor.join().expect("monitor thread");

        assert!(matches!(cell.take(), WaitOutcome::TimedOut));
    }

    #[test]
    fn unserviced_loop_resolves_stalled() {
        let cell: Arc<ResolveCell<u32>> = Arc::new(ResolveCell::new());
        let drive = Arc::new(DriveLoop::new());

        // Nobody pumps the loop: the posted confirmation never runs.
        let start = Instant::now();
        fire(Duration::from_millis(50), &cell, &drive);

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(matches!(cell.take(), WaitOutcome::StalledLoop));
    }
}
