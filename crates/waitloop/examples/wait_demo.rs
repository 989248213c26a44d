// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

#![allow(clippy::unwrap_used)] // Demo code panics on failure
#![allow(clippy::uninlined_format_args)] // Demo readability over pedantic

//! Wait Demo - blocking on asynchronous conditions
//!
//! Demonstrates both waiting modes: capturing a single async result and
//! polling a shared flag until a background thread flips it.
//!
//! Run with: cargo run --package waitloop --example wait_demo

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use waitloop::{WaitOutcome, Waiter};

fn main() {
    println!("=== waitloop demo ===\n");

    let waiter = Waiter::new();

    // 1. Single-shot: a background worker delivers one result.
    let outcome = waiter.run_async(Duration::from_secs(2), |done| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            done.complete("worker finished");
        });
    });
    println!("[OK] run_async resolved: {:?}", outcome.completed());

    // 2. Polling: wait for a flag flipped from another thread.
    let flag = Arc::new(AtomicBool::new(false));
    let flipper = Arc::clone(&flag);
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(80));
        flipper.store(true, Ordering::SeqCst);
    });

    let watched = Arc::clone(&flag);
    let outcome = waiter.poll_until(
        Duration::from_secs(2),
        Duration::from_millis(10),
        move || {
            if watched.load(Ordering::SeqCst) {
                Ok(Some("flag observed"))
            } else {
                Ok(None)
            }
        },
    );
    println!("[OK] poll_until resolved: {:?}", outcome.completed());

    // 3. A wait that cannot succeed reports TimedOut, not a hang.
    let outcome: WaitOutcome<()> = waiter.run_async(Duration::from_millis(200), |_done| {
        // Completion deliberately never invoked.
    });
    println!("[OK] unfulfilled wait ended as: {:?}", outcome);
}
