// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Cancellable background timers.
//!
//! Each registration runs on its own named thread and selects between the
//! fire deadline and a cancel channel. Cancellation is idempotent and safe
//! to race with an in-flight fire: a fire that loses the resolve-cell race
//! downstream is simply a no-op. Dropping a [`TimerHandle`] also cancels.

use crossbeam::channel::{after, bounded, Sender};
use crossbeam::select;
use std::thread;
use std::time::Duration;

/// Handle to a background timer registration.
///
/// Exclusively owned by the wait that created it; cancelled on every exit
/// path so no fire can leak into a later wait.
pub struct TimerHandle {
    cancel: Sender<()>,
}

impl TimerHandle {
    /// Cancel the registration. Idempotent.
    pub fn cancel(&self) {
        // try_send: the buffer holds at most one token and a finished timer
        // thread has dropped its receiver; both cases are fine to ignore.
        let _ = self.cancel.try_send(());
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `f` once after `delay` unless cancelled first.
///
/// A zero delay fires immediately; it is not special-cased.
pub fn oneshot(name: &str, delay: Duration, f: impl FnOnce() + Send + 'static) -> TimerHandle {
    let (tx, rx) = bounded(1);
    spawn_timer(name, move || {
        select! {
            recv(rx) -> _ => {}
            recv(after(delay)) -> _ => f(),
        }
    });
    TimerHandle { cancel: tx }
}

/// Run `f` every `interval` until cancelled. The first tick fires
/// immediately so a condition that already holds is noticed without
/// waiting a full interval.
pub fn periodic(name: &str, interval: Duration, mut f: impl FnMut() + Send + 'static) -> TimerHandle {
    let (tx, rx) = bounded(1);
    spawn_timer(name, move || loop {
        f();
        select! {
            recv(rx) -> _ => return,
            recv(after(interval)) -> _ => {}
        }
    });
    TimerHandle { cancel: tx }
}

fn spawn_timer(name: &str, body: impl FnOnce() + Send + 'static) {
    #[allow(clippy::expect_used)] // a wait without its timeout timer would hang forever
    thread::Builder::new()
        .name(format!("waitloop-{}", name))
        .spawn(body)
        .expect("failed to spawn timer thread");
}
