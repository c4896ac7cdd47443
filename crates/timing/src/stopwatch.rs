//! Stopwatch backends
//!
//! One trait, three clocks. Callers pick a [`TimerBackend`] once, get a boxed
//! [`Stopwatch`] from [`create`], and never look at the backend again.
//! A stopwatch is owned by the thread that created it.
//!
//! ```text
//! let mut sw = create(TimerBackend::Posix);
//! sw.start();
//! work();
//! sw.stop();
//! let seconds = sw.runtime();
//! ```

use crate::cycles::{self, read_cycles};
use roofline_core::TimerBackend;
use std::time::Instant;

/// A start/stop interval timer.
pub trait Stopwatch: Send {
    /// Record the start of the interval.
    fn start(&mut self);

    /// Record the end of the interval.
    fn stop(&mut self);

    /// Seconds between the last `start` and `stop`.
    fn runtime(&self) -> f64;

    /// The clock behind this stopwatch.
    fn backend(&self) -> TimerBackend;
}

/// Create a stopwatch for `backend`.
///
/// Cycle-counter stopwatches capture the process-wide calibrated frequency at
/// creation, or [`cycles::NOMINAL_CYCLE_FREQUENCY`] (with a one-time warning)
/// if calibration has not run.
pub fn create(backend: TimerBackend) -> Box<dyn Stopwatch> {
    match backend {
        TimerBackend::Std => Box::new(StdStopwatch::new()),
        TimerBackend::Posix => Box::new(PosixStopwatch::new()),
        TimerBackend::Tsc => Box::new(CycleStopwatch::new()),
    }
}

// ============================================================================
// std::time::Instant
// ============================================================================

/// Wall-clock stopwatch over `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct StdStopwatch {
    start: Instant,
    end: Instant,
}

impl StdStopwatch {
    /// New stopwatch with an empty interval.
    pub fn new() -> Self {
        let now = Instant::now();
        StdStopwatch {
            start: now,
            end: now,
        }
    }
}

impl Default for StdStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch for StdStopwatch {
    #[inline]
    fn start(&mut self) {
        self.start = Instant::now();
    }

    #[inline]
    fn stop(&mut self) {
        self.end = Instant::now();
    }

    fn runtime(&self) -> f64 {
        self.end.saturating_duration_since(self.start).as_secs_f64()
    }

    fn backend(&self) -> TimerBackend {
        TimerBackend::Std
    }
}

// ============================================================================
// clock_gettime(CLOCK_MONOTONIC_RAW)
// ============================================================================

/// Monotonic-raw stopwatch over `clock_gettime`.
///
/// Uses `CLOCK_MONOTONIC_RAW` where the platform has it and the NTP-adjusted
/// `CLOCK_MONOTONIC` otherwise.
#[cfg(unix)]
#[derive(Clone, Copy)]
pub struct PosixStopwatch {
    start: cycles::Timespec,
    end: cycles::Timespec,
}

#[cfg(unix)]
impl PosixStopwatch {
    /// New stopwatch with an empty interval.
    pub fn new() -> Self {
        let now = cycles::monotonic_now();
        PosixStopwatch {
            start: now,
            end: now,
        }
    }
}

#[cfg(unix)]
impl std::fmt::Debug for PosixStopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosixStopwatch")
            .field("runtime", &self.runtime())
            .finish()
    }
}

#[cfg(unix)]
impl Stopwatch for PosixStopwatch {
    #[inline]
    fn start(&mut self) {
        self.start = cycles::monotonic_now();
    }

    #[inline]
    fn stop(&mut self) {
        self.end = cycles::monotonic_now();
    }

    fn runtime(&self) -> f64 {
        let secs = (self.end.tv_sec - self.start.tv_sec) as f64;
        let nanos = (self.end.tv_nsec - self.start.tv_nsec) as f64;
        (secs + nanos / 1e9).max(0.0)
    }

    fn backend(&self) -> TimerBackend {
        TimerBackend::Posix
    }
}

/// Platforms without `clock_gettime` time the monotonic backend with `Instant`.
#[cfg(not(unix))]
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixStopwatch(StdStopwatch);

#[cfg(not(unix))]
impl PosixStopwatch {
    /// New stopwatch with an empty interval.
    pub fn new() -> Self {
        PosixStopwatch(StdStopwatch::new())
    }
}

#[cfg(not(unix))]
impl Stopwatch for PosixStopwatch {
    fn start(&mut self) {
        self.0.start();
    }

    fn stop(&mut self) {
        self.0.stop();
    }

    fn runtime(&self) -> f64 {
        self.0.runtime()
    }

    fn backend(&self) -> TimerBackend {
        TimerBackend::Posix
    }
}

#[cfg(unix)]
impl Default for PosixStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Cycle counter
// ============================================================================

/// Cycle-counter stopwatch.
///
/// Counts are converted to seconds with the frequency captured at creation.
#[derive(Debug, Clone, Copy)]
pub struct CycleStopwatch {
    start: u64,
    end: u64,
    frequency: f64,
}

impl CycleStopwatch {
    /// New stopwatch using the calibrated frequency.
    ///
    /// Before calibration this uses [`cycles::NOMINAL_CYCLE_FREQUENCY`] and
    /// logs a warning the first time it happens.
    pub fn new() -> Self {
        Self::with_frequency(cycles::cycle_frequency_or_nominal())
    }

    /// New stopwatch converting counts at `frequency` cycles per second.
    pub fn with_frequency(frequency: f64) -> Self {
        CycleStopwatch {
            start: 0,
            end: 0,
            frequency,
        }
    }

    /// Cycles per second used by [`Stopwatch::runtime`].
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Raw cycle count of the last interval.
    pub fn cycles(&self) -> u64 {
        // Counters on different cores may disagree slightly.
        self.end.saturating_sub(self.start)
    }
}

impl Default for CycleStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch for CycleStopwatch {
    #[inline]
    fn start(&mut self) {
        self.start = read_cycles();
    }

    #[inline]
    fn stop(&mut self) {
        self.end = read_cycles();
    }

    fn runtime(&self) -> f64 {
        self.cycles() as f64 / self.frequency
    }

    fn backend(&self) -> TimerBackend {
        TimerBackend::Tsc
    }
}
