//! Pre-sweep calibration
//!
//! Two jobs, both run once per process before any measurement:
//!
//! 1. **Rev-up**: spin a doubling increment loop until one attempt takes at
//!    least [`REVUP_TARGET`] seconds, so the core has left any low-power or
//!    boost-transition state before short measurements start.
//! 2. **Cycle-counter calibration**: for the `tsc` backend only, count cycles
//!    across a busy interval timed by the monotonic clock and store the ratio
//!    as the process-wide frequency. The busy interval revs the core up on
//!    its own, so rev-up is skipped for that backend.

use crate::cycles::{self, read_cycles};
use crate::stopwatch::{self, PosixStopwatch, Stopwatch};
use once_cell::sync::OnceCell;
use roofline_core::{Error, Result, TimerBackend};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Runtime in seconds a rev-up attempt must reach.
pub const REVUP_TARGET: f64 = 0.1;

/// Doublings after which rev-up is declared non-convergent.
pub const MAX_REVUP_DOUBLINGS: u32 = 48;

/// Length in seconds of the cycle-counting interval.
pub const CALIBRATION_INTERVAL: f64 = 0.1;

static REVUP: OnceCell<RevUp> = OnceCell::new();

/// Outcome of the frequency rev-up loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevUp {
    /// Increments in the attempt that reached the target
    pub iterations: u64,
    /// Runtime of that attempt in seconds
    pub runtime: f64,
}

/// Result of [`calibrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Backend the sweep will time with
    pub backend: TimerBackend,
    /// Calibrated cycles per second (`tsc` only)
    pub cycle_frequency: Option<f64>,
    /// Rev-up outcome (all other backends)
    pub revup: Option<RevUp>,
}

/// Prepare the process for measuring with `backend`.
///
/// Rev-up and cycle calibration each happen at most once per process;
/// later calls return the stored outcome.
///
/// # Errors
///
/// Returns [`Error::CalibrationDiverged`] if rev-up never reaches its target.
pub fn calibrate(backend: TimerBackend) -> Result<Calibration> {
    match backend {
        TimerBackend::Tsc => {
            let frequency = calibrate_cycle_counter();
            Ok(Calibration {
                backend,
                cycle_frequency: Some(frequency),
                revup: None,
            })
        }
        TimerBackend::Std | TimerBackend::Posix => {
            let revup = *REVUP.get_or_try_init(|| {
                let revup = rev_up(backend, REVUP_TARGET, MAX_REVUP_DOUBLINGS)?;
                info!(
                    backend = %backend,
                    iterations = revup.iterations,
                    runtime = revup.runtime,
                    "CPU frequency rev-up complete"
                );
                Ok::<_, Error>(revup)
            })?;
            Ok(Calibration {
                backend,
                cycle_frequency: None,
                revup: Some(revup),
            })
        }
    }
}

/// Determine (once) and return the process-wide cycle frequency.
pub fn calibrate_cycle_counter() -> f64 {
    cycles::set_cycle_frequency_once(|| {
        let frequency = measure_cycle_frequency(CALIBRATION_INTERVAL);
        info!(
            frequency_ghz = frequency / 1e9,
            "cycle counter calibrated"
        );
        frequency
    })
}

/// Count cycles across a busy interval of at least `interval` seconds.
pub fn measure_cycle_frequency(interval: f64) -> f64 {
    let mut wall = PosixStopwatch::new();
    wall.start();
    let c0 = read_cycles();
    let mut c1;
    loop {
        c1 = read_cycles();
        wall.stop();
        if wall.runtime() >= interval {
            break;
        }
    }
    c1.saturating_sub(c0) as f64 / wall.runtime()
}

/// Double an increment loop until one attempt takes `target` seconds.
///
/// # Errors
///
/// Returns [`Error::CalibrationDiverged`] after `max_doublings` attempts.
pub fn rev_up(backend: TimerBackend, target: f64, max_doublings: u32) -> Result<RevUp> {
    let mut timer = stopwatch::create(backend);
    let mut iterations: u64 = 1;
    let mut attempted = 0;
    let mut runtime = 0.0;

    for _ in 0..=max_doublings {
        attempted = iterations;
        timer.start();
        spin(iterations);
        timer.stop();
        runtime = timer.runtime();
        debug!(iterations, runtime, "rev-up attempt");

        if runtime >= target {
            return Ok(RevUp {
                iterations,
                runtime,
            });
        }
        iterations = iterations.saturating_mul(2);
    }

    Err(Error::CalibrationDiverged {
        iterations: attempted,
        runtime,
    })
}

/// Busy loop whose increments are an observable side effect.
fn spin(iterations: u64) -> u64 {
    let counter = AtomicU64::new(0);
    black_box(&counter);
    for _ in 0..iterations {
        counter.fetch_add(1, Ordering::Relaxed);
    }
    black_box(counter.load(Ordering::Relaxed))
}
