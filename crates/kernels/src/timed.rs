//! Adaptive timed loop shared by every kernel
//!
//! ## Round protocol
//!
//! ```text
//! reps = 1
//! loop:
//!   barrier                      all threads open the window together
//!   start; step() x reps; stop   private stopwatch
//!   runtime >= min_runtime  ->  raise runtime flag
//!   barrier                      every thread has reported
//!   flag raised -> done, else reps *= 2
//! ```
//!
//! The flag is read only after the second barrier and only ever raised after
//! the first, so every thread sees the same value and all leave in the same
//! round. `min_runtime` is a floor: a round always finishes all its reps.
//!
//! If the trial barrier is abandoned (another worker failed), the loop
//! returns at once with an empty round.

use roofline_core::{KernelArgs, RoofCost, ThreadResult, TimerBackend, TrialContext};
use roofline_timing::stopwatch;
use std::hint::black_box;
use tracing::debug;

/// Final round of a timed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedRound {
    /// Calls to `step` in the round
    pub reps: u64,
    /// Duration of the round in seconds
    pub runtime: f64,
}

impl TimedRound {
    /// Round reported when the trial was abandoned
    pub const ABANDONED: TimedRound = TimedRound {
        reps: 0,
        runtime: 0.0,
    };

    /// Thread result for a step costing `cost`.
    pub fn result(&self, cost: RoofCost) -> ThreadResult {
        ThreadResult::from_cost(cost, self.reps, self.runtime)
    }
}

/// Run `step` in doubling rounds until some thread's round lasts `min_runtime`.
pub fn timed_loop<F>(
    ctx: &TrialContext,
    timer: TimerBackend,
    min_runtime: f64,
    mut step: F,
) -> TimedRound
where
    F: FnMut(),
{
    let mut sw = stopwatch::create(timer);
    let mut reps: u64 = 1;

    loop {
        if !ctx.barrier().wait() {
            debug!("trial abandoned, leaving timed loop");
            return TimedRound::ABANDONED;
        }

        sw.start();
        for _ in 0..reps {
            step();
        }
        sw.stop();
        let runtime = sw.runtime();

        if runtime >= min_runtime {
            ctx.raise_runtime_flag();
        }

        if !ctx.barrier().wait() {
            debug!("trial abandoned, leaving timed loop");
            return TimedRound::ABANDONED;
        }

        if ctx.runtime_flag() {
            return TimedRound { reps, runtime };
        }
        reps = reps.saturating_mul(2);
    }
}

/// Thread routine for kernels that apply a vector operation.
///
/// Applies `args.roof` to this thread's `x`/`y` slices until the minimum
/// runtime is reached and accounts the final round with the operation's cost.
pub fn roof_thread(args: &mut KernelArgs<'_>) -> ThreadResult {
    let Some(roof) = args.roof else {
        debug!(tid = args.tid, "no vector operation registered, skipping");
        return ThreadResult::default();
    };

    let (n, a, b, x) = (args.n, args.a, args.b, args.x);
    let y = &mut *args.y;

    let round = timed_loop(args.ctx, args.timer, args.min_runtime, || {
        (roof.op)(n, a, b, x, y);
        black_box(&*y);
    });

    round.result((roof.cost)(n))
}
