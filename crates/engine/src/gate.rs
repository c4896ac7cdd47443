//! Start gate for trial workers
//!
//! Workers are spawned one at a time; if a later spawn fails, the workers
//! already running must not reach the trial barrier, which would wait for
//! the missing thread forever. Every worker therefore parks at the gate
//! until the spawner either opens it (all threads exist) or aborts it.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Aborted,
}

/// One-shot open/abort latch.
#[derive(Debug)]
pub struct StartGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl StartGate {
    /// A closed gate.
    pub fn new() -> Self {
        StartGate {
            state: Mutex::new(GateState::Closed),
            changed: Condvar::new(),
        }
    }

    /// Release all waiters into the trial.
    pub fn open(&self) {
        self.settle(GateState::Open);
    }

    /// Release all waiters with the instruction to exit.
    pub fn abort(&self) {
        self.settle(GateState::Aborted);
    }

    /// Block until the gate is settled. Returns `true` if opened.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Closed {
            self.changed.wait(&mut state);
        }
        *state == GateState::Open
    }

    fn settle(&self, to: GateState) {
        let mut state = self.state.lock();
        if *state == GateState::Closed {
            *state = to;
        }
        self.changed.notify_all();
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}
