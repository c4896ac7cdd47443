//! Abandonable trial barrier
//!
//! A reusable generation barrier like `std::sync::Barrier`, except that it
//! can be abandoned: once a participant fails, every current and future
//! waiter returns immediately instead of waiting for a thread that will
//! never arrive.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    abandoned: bool,
}

/// Barrier shared by the workers of one trial.
#[derive(Debug)]
pub struct TrialBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl TrialBarrier {
    /// Barrier for `parties` threads.
    pub fn new(parties: usize) -> Self {
        TrialBarrier {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                abandoned: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Block until all parties arrive.
    ///
    /// Returns `false` if the barrier was abandoned before this generation
    /// completed; the caller should leave the trial.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        if state.abandoned {
            return false;
        }
        state.arrived += 1;
        if state.arrived >= self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return true;
        }
        let generation = state.generation;
        while state.generation == generation && !state.abandoned {
            self.released.wait(&mut state);
        }
        state.generation != generation
    }

    /// Release every waiter and make later waits return `false`.
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        state.abandoned = true;
        self.released.notify_all();
    }

    /// Whether [`TrialBarrier::abandon`] was called since the last reset.
    pub fn is_abandoned(&self) -> bool {
        self.state.lock().abandoned
    }

    /// Return to a fresh generation; only valid while no thread is waiting.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.arrived = 0;
        state.abandoned = false;
    }
}
