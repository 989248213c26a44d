// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Resolve-once cell: the single synchronization point of the engine.
//!
//! The timeout monitor, the action runner, and the coordinator all race to
//! resolve one `ResolveCell` per wait. Exactly one attempt wins; the winner's
//! side-effect closure runs exactly once (it is what stops the driving loop),
//! and losing attempts are silently dropped.

use crate::outcome::WaitOutcome;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-assignment container for the first winning [`WaitOutcome`].
///
/// Safe to call from any number of threads simultaneously. Lifetime is one
/// wait call; the coordinator takes the outcome out after the pump exits.
pub struct ResolveCell<T> {
    state: Mutex<WaitOutcome<T>>,
    resolved: AtomicBool,
}

impl<T> ResolveCell<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WaitOutcome::Incomplete),
            resolved: AtomicBool::new(false),
        }
    }

    /// Resolve the cell if it is still incomplete.
    ///
    /// Returns `true` and runs `on_win` only for the winning attempt. The
    /// winner is decided under the state lock; `on_win` runs after the lock
    /// is released so it may freely touch the driving loop.
    pub fn try_resolve(&self, outcome: WaitOutcome<T>, on_win: impl FnOnce()) -> bool {
        debug_assert!(!outcome.is_incomplete(), "cannot resolve to Incomplete");
        let label = outcome.label();
        {
            let mut state = self.state.lock();
            if self.resolved.load(Ordering::Acquire) {
                log::trace!("[cell] late {} resolution dropped", label);
                return false;
            }
            *state = outcome;
            self.resolved.store(true, Ordering::Release);
        }
        log::trace!("[cell] resolved: {}", label);
        on_win();
        true
    }

    /// Non-blocking check used by the pump loop.
    pub fn is_incomplete(&self) -> bool {
        !self.resolved.load(Ordering::Acquire)
    }

    /// Take the resolved outcome, leaving `Incomplete` behind.
    pub fn take(&self) -> WaitOutcome<T> {
        std::mem::replace(&mut *self.state.lock(), WaitOutcome::Incomplete)
    }
}
