// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 waitloop contributors

//! Wait gate: one active wait per driving thread.
//!
//! Nested waits would compete to drive the same loop, so admission is a
//! structural precondition. Violations are programmer misuse and surface as
//! panics, never as a [`WaitOutcome`](crate::WaitOutcome); the coordinator
//! re-raises them even when they unwind through its panic capture.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;
use std::thread::{self, ThreadId};

/// Diagnostic snapshot of an in-flight wait: operation name plus the source
/// location that initiated it. Echoed into the nesting diagnostic.
#[derive(Clone, Copy)]
pub struct WaitRecord {
    pub name: &'static str,
    pub location: &'static Location<'static>,
}

impl fmt::Display for WaitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.name,
            self.location.file(),
            self.location.line()
        )
    }
}

thread_local! {
    // The record of the wait currently driving this thread's loop. Mutated
    // only on the driving thread.
    static ACTIVE_WAIT: Cell<Option<WaitRecord>> = const { Cell::new(None) };

    // Set just before a precondition panic so the coordinator can tell
    // misuse apart from panics raised by user code.
    static PRECONDITION_TRIPPED: Cell<bool> = const { Cell::new(false) };
}

/// Token proving admission. Clears the active record on drop, re-enabling
/// future waits on every exit path including unwinding.
pub struct WaitToken {
    // Gate state is thread-local; the token must not migrate.
    _not_send: PhantomData<*const ()>,
}

impl Drop for WaitToken {
    fn drop(&mut self) {
        ACTIVE_WAIT.with(|active| active.set(None));
    }
}

/// Admit one wait on the driving thread.
///
/// Panics when called off the loop's owner thread or while another wait is
/// active. The nesting message names both the new attempt and the wait
/// currently holding the gate.
pub fn admit(owner: ThreadId, record: WaitRecord) -> WaitToken {
    if thread::current().id() != owner {
        trip(format!(
            "{} can only be called from the thread that owns the driving loop",
            record
        ));
    }
    if let Some(current) = ACTIVE_WAIT.with(Cell::get) {
        trip(format!(
            "nested waits are not allowed\n\nThe call to\n\t{}\ntriggered this panic because\n\t{}\nis currently driving the loop.",
            record, current
        ));
    }
    ACTIVE_WAIT.with(|active| active.set(Some(record)));
    WaitToken {
        _not_send: PhantomData,
    }
}

/// True if the most recent panic on this thread was a gate precondition.
/// Reading clears the flag.
pub(crate) fn precondition_tripped() -> bool {
    PRECONDITION_TRIPPED.with(|tripped| tripped.replace(false))
}

fn trip(message: String) -> ! {
    PRECONDITION_TRIPPED.with(|tripped| tripped.set(true));
    panic!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &'static str) -> WaitRecord {
        WaitRecord {
            name,
            location: Location::caller(),
        }
    }

    #[test]
    fn admit_and_release() {
        let owner = thread::current().id();
        let token = admit(owner, record("poll_until"));
        drop(token);
        // Gate is free again.
        let _token = admit(owner, record("run_async"));
    }

    #[test]
    fn nested_admission_names_both_call_sites() {
        let owner = thread::current().id();
        let _token = admit(owner, record("outer_wait"));

        let result = std::panic::catch_unwind(|| {
            let _ = admit(owner, record("inner_wait"));
        });
        assert!(precondition_tripped());

        let payload = result.err().expect("nested admit must panic");
        let message = payload
            .downcast_ref::<String>()
            .expect("panic message is a String");
        assert!(message.contains("nested waits are not allowed"));
        assert!(message.contains("outer_wait"));
        assert!(message.contains("inner_wait"));
    }

    #[test]
    fn wrong_thread_admission_panics() {
        let owner = thread::current().id();
        let rec = record("run_async");
        let result = thread::spawn(move || {
            let panicked = std::panic::catch_unwind(|| {
                let _ = admit(owner, rec);
            })
            .is_err();
            assert!(panicked, "wrong-thread admit must panic");
            precondition_tripped()
        })
        .join()
        .expect("probe thread");
        assert!(result);
    }

    #[test]
    fn release_happens_on_unwind() {
        let owner = thread::current().id();
        let _ = std::panic::catch_unwind(|| {
            let _token = admit(owner, record("doomed_wait"));
            panic!("user code exploded");
        });
        // Token dropped during unwind; the gate is free again.
        let _token = admit(owner, record("next_wait"));
    }
}
