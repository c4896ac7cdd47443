//! Kernel contract
//!
//! Every benchmark kernel is a plain function taking a [`KernelArgs`] bundle
//! and returning the [`ThreadResult`] for its slot. A kernel must:
//!
//! 1. wait at [`TrialContext::barrier`] so all threads open their timed
//!    region together,
//! 2. repeat its operation, re-timing with its own stopwatch, until the
//!    elapsed time reaches `min_runtime`,
//! 3. report runtime, flops, bytes loaded and bytes stored.
//!
//! Pinning happens in the engine before the kernel is entered.

use crate::barrier::TrialBarrier;
use crate::timer::TimerBackend;
use parking_lot::Mutex;
use serde::Serialize;

/// Bytes per vector element.
pub const ELEMENT_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// Work done by one application of a roof operation, in elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoofCost {
    /// Floating-point operations
    pub flops: u64,
    /// Elements read
    pub loads: u64,
    /// Elements written
    pub stores: u64,
}

impl RoofCost {
    /// Cost of an operation that never touches memory.
    pub const fn compute(flops: u64) -> Self {
        RoofCost {
            flops,
            loads: 0,
            stores: 0,
        }
    }

    /// Bytes read per application.
    pub fn bytes_loaded(&self) -> u64 {
        self.loads * ELEMENT_BYTES
    }

    /// Bytes written per application.
    pub fn bytes_stored(&self) -> u64 {
        self.stores * ELEMENT_BYTES
    }
}

/// One application of a vector operation over `n` elements.
pub type RoofOp = fn(n: usize, a: f32, b: f32, x: &[f32], y: &mut [f32]);

/// Flop and traffic accounting for a [`RoofOp`] at length `n`.
pub type RoofCostFn = fn(n: usize) -> RoofCost;

/// A vector operation paired with its accounting.
#[derive(Clone, Copy)]
pub struct Roof {
    /// The operation
    pub op: RoofOp,
    /// Its accounting
    pub cost: RoofCostFn,
}

impl std::fmt::Debug for Roof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roof").finish_non_exhaustive()
    }
}

/// Shared coordination state for one sweep.
///
/// Owned by the sweep, borrowed by every worker of every trial. The runtime
/// flag and the barrier are reset by the engine before each trial; the
/// barrier is abandoned if a worker fails mid-trial.
#[derive(Debug)]
pub struct TrialContext {
    threads: usize,
    barrier: TrialBarrier,
    runtime_flag: Mutex<bool>,
}

impl TrialContext {
    /// Coordination state for `threads` participants.
    pub fn new(threads: usize) -> Self {
        TrialContext {
            threads,
            barrier: TrialBarrier::new(threads),
            runtime_flag: Mutex::new(false),
        }
    }

    /// Number of participating threads
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Barrier every participant passes before and after each timed round.
    pub fn barrier(&self) -> &TrialBarrier {
        &self.barrier
    }

    /// Mark that some thread has reached the minimum runtime.
    pub fn raise_runtime_flag(&self) {
        *self.runtime_flag.lock() = true;
    }

    /// Whether any thread has reached the minimum runtime this trial.
    pub fn runtime_flag(&self) -> bool {
        *self.runtime_flag.lock()
    }

    /// Clear the runtime flag and the barrier; called between trials,
    /// never during one.
    pub fn reset(&self) {
        *self.runtime_flag.lock() = false;
        self.barrier.reset();
    }
}

/// Per-thread, per-trial argument bundle.
#[derive(Debug)]
pub struct KernelArgs<'a> {
    /// Thread slot
    pub tid: usize,
    /// Vector length handled by this thread
    pub n: usize,
    /// Scalar coefficient `a`
    pub a: f32,
    /// Scalar coefficient `b`
    pub b: f32,
    /// Input buffer, `n` elements
    pub x: &'a [f32],
    /// Output buffer, `n` elements
    pub y: &'a mut [f32],
    /// Minimum timed-region duration in seconds
    pub min_runtime: f64,
    /// Stopwatch backend
    pub timer: TimerBackend,
    /// Vector operation, for kernels that run one
    pub roof: Option<Roof>,
    /// Sweep coordination state
    pub ctx: &'a TrialContext,
}

/// The fixed kernel signature.
pub type KernelFn = fn(&mut KernelArgs<'_>) -> ThreadResult;

/// A registered benchmark kernel.
#[derive(Clone)]
pub struct Kernel {
    /// Display name
    pub name: String,
    /// Thread routine
    pub body: KernelFn,
    /// Vector operation handed to `body`, if any
    pub roof: Option<Roof>,
}

impl Kernel {
    /// Kernel running its own thread routine.
    pub fn new(name: impl Into<String>, body: KernelFn) -> Self {
        Kernel {
            name: name.into(),
            body,
            roof: None,
        }
    }

    /// Kernel running a vector operation through `body`.
    pub fn with_roof(name: impl Into<String>, body: KernelFn, roof: Roof) -> Self {
        Kernel {
            name: name.into(),
            body,
            roof: Some(roof),
        }
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("roof", &self.roof)
            .finish_non_exhaustive()
    }
}

/// Output side of one thread's trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThreadResult {
    /// Duration of the final timed round in seconds
    pub runtime: f64,
    /// Operation applications in the final round
    pub reps: u64,
    /// Floating-point operations in the final round
    pub flops: u64,
    /// Bytes read in the final round
    pub bytes_loaded: u64,
    /// Bytes written in the final round
    pub bytes_stored: u64,
}

impl ThreadResult {
    /// Result of `reps` applications of an operation costing `cost`.
    pub fn from_cost(cost: RoofCost, reps: u64, runtime: f64) -> Self {
        ThreadResult {
            runtime,
            reps,
            flops: cost.flops * reps,
            bytes_loaded: cost.bytes_loaded() * reps,
            bytes_stored: cost.bytes_stored() * reps,
        }
    }

    /// Floating-point operations per second.
    pub fn flop_rate(&self) -> f64 {
        rate(self.flops, self.runtime)
    }

    /// Bytes read per second.
    pub fn load_bandwidth(&self) -> f64 {
        rate(self.bytes_loaded, self.runtime)
    }

    /// Bytes written per second.
    pub fn store_bandwidth(&self) -> f64 {
        rate(self.bytes_stored, self.runtime)
    }
}

fn rate(amount: u64, runtime: f64) -> f64 {
    if runtime > 0.0 {
        amount as f64 / runtime
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_bytes_use_element_size() {
        let cost = RoofCost {
            flops: 2,
            loads: 2,
            stores: 1,
        };
        assert_eq!(cost.bytes_loaded(), 8);
        assert_eq!(cost.bytes_stored(), 4);
    }

    #[test]
    fn thread_result_scales_by_reps() {
        let cost = RoofCost {
            flops: 2048,
            loads: 2048,
            stores: 1024,
        };
        let result = ThreadResult::from_cost(cost, 10, 0.5);
        assert_eq!(result.flops, 20480);
        assert_eq!(result.bytes_loaded, 2048 * 4 * 10);
        assert_eq!(result.bytes_stored, 1024 * 4 * 10);
        assert_eq!(result.flop_rate(), 40960.0);
    }

    #[test]
    fn zero_runtime_has_zero_rate() {
        let result = ThreadResult::from_cost(RoofCost::compute(8), 4, 0.0);
        assert_eq!(result.flop_rate(), 0.0);
        assert_eq!(result.load_bandwidth(), 0.0);
    }

    #[test]
    fn runtime_flag_resets() {
        let ctx = TrialContext::new(1);
        assert!(!ctx.runtime_flag());
        ctx.raise_runtime_flag();
        assert!(ctx.runtime_flag());
        ctx.reset();
        assert!(!ctx.runtime_flag());
    }

    #[test]
    fn single_thread_barrier_does_not_block() {
        let ctx = TrialContext::new(1);
        assert!(ctx.barrier().wait());
    }
}
