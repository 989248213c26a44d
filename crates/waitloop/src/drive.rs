// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Cooperative driving loop.
//!
//! A `DriveLoop` is a task queue owned by exactly one thread (the thread
//! that constructed it). Any thread may [`post`](DriveLoop::post) work onto
//! it or [`stop`](DriveLoop::stop) the pass currently running; only the
//! owner may [`run`](DriveLoop::run) a pass. The wait coordinator pumps the
//! loop in passes rather than truly blocking, which keeps the loop
//! responsive to the timeout monitor's interrupt and to completions
//! dispatched from background threads.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Single-owner cooperative task queue.
pub struct DriveLoop {
    tx: Sender<Task>,
    rx: Receiver<Task>,
    stop: AtomicBool,
    owner: ThreadId,
}

impl DriveLoop {
    /// Create a loop owned by the current thread.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            stop: AtomicBool::new(false),
            owner: thread::current().id(),
        }
    }

    /// The thread that owns this loop.
    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Post a task onto the loop. Callable from any thread; wakes a pass
    /// blocked on an empty queue.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        // Send fails only if the receiver is gone, which cannot outlive self.
        let _ = self.tx.send(Box::new(task));
    }

    /// End the pass currently running (or the next one started).
    ///
    /// Callable from any thread. This both interrupts a pass blocked on an
    /// empty queue and hands control back to whoever called [`run`], which
    /// decides whether to run another pass. Posting the wake task after
    /// setting the flag guarantees a blocked `recv` observes the stop.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.post(|| {});
    }

    /// Run one pass: execute posted tasks, blocking while the queue is
    /// empty, until stopped. Owner thread only.
    pub fn run(&self) {
        assert!(
            self.is_owner(),
            "DriveLoop::run called off the owner thread"
        );
        loop {
            if self.stop.swap(false, Ordering::AcqRel) {
                return;
            }
            match self.rx.recv() {
                Ok(task) => task(),
                Err(_) => return,
            }
        }
    }
}

impl Default for DriveLoop {
    fn default() -> Self {
        Self::new()
    }
}
