//! Raw clock reads
//!
//! Cycle counter and `clock_gettime` access. The cycle counter is serialized
//! with `CPUID` so earlier instructions retire before the read. On targets
//! without a readable cycle counter the monotonic clock in nanoseconds stands
//! in, which calibrates to roughly 1 GHz.

use once_cell::sync::{Lazy, OnceCell};
use std::sync::Once;
use tracing::warn;

/// Frequency assumed by cycle-counter stopwatches created before calibration.
pub const NOMINAL_CYCLE_FREQUENCY: f64 = 2.59e9;

static CYCLE_FREQUENCY: OnceCell<f64> = OnceCell::new();

/// Calibrated cycles per second, if calibration has run in this process.
pub fn cycle_frequency() -> Option<f64> {
    CYCLE_FREQUENCY.get().copied()
}

static UNCALIBRATED_WARNING: Once = Once::new();

/// Calibrated frequency, or [`NOMINAL_CYCLE_FREQUENCY`] with a one-time
/// warning if calibration has not run.
pub fn cycle_frequency_or_nominal() -> f64 {
    match cycle_frequency() {
        Some(frequency) => frequency,
        None => {
            warn_uncalibrated_once();
            NOMINAL_CYCLE_FREQUENCY
        }
    }
}

/// Returns `true` only for the call that emitted the warning.
fn warn_uncalibrated_once() -> bool {
    let mut emitted = false;
    UNCALIBRATED_WARNING.call_once(|| {
        warn!(
            nominal = NOMINAL_CYCLE_FREQUENCY,
            "cycle counter not calibrated, assuming nominal frequency"
        );
        emitted = true;
    });
    emitted
}

/// Store the process-wide cycle frequency, keeping any earlier value.
///
/// Returns the frequency in effect afterwards.
pub(crate) fn set_cycle_frequency_once(init: impl FnOnce() -> f64) -> f64 {
    *CYCLE_FREQUENCY.get_or_init(init)
}

/// Serialized read of the timestamp counter.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub fn read_cycles() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: CPUID and RDTSC are available on every x86_64 CPU and only
    // write the registers named here. CPUID's rbx clobber is handled by the
    // intrinsic.
    unsafe {
        core::arch::x86_64::__cpuid(0);
        core::arch::asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    (u64::from(hi) << 32) | u64::from(lo)
}

#[cfg(not(target_arch = "x86_64"))]
static EPOCH: Lazy<std::time::Instant> = Lazy::new(std::time::Instant::now);

/// Monotonic nanoseconds standing in for a cycle counter.
#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub fn read_cycles() -> u64 {
    EPOCH.elapsed().as_nanos() as u64
}

#[cfg(unix)]
pub use self::posix::{monotonic_clock, monotonic_now, Timespec};

#[cfg(unix)]
mod posix {
    use super::Lazy;
    use tracing::warn;

    /// Seconds and nanoseconds of a clock reading.
    pub type Timespec = libc::timespec;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    const PREFERRED_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC_RAW;
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    const PREFERRED_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

    static CLOCK: Lazy<libc::clockid_t> = Lazy::new(|| {
        let mut ts = zero();
        // SAFETY: `ts` is a valid, writable timespec.
        let rc = unsafe { libc::clock_gettime(PREFERRED_CLOCK, &mut ts) };
        if rc == 0 {
            PREFERRED_CLOCK
        } else {
            warn!("raw monotonic clock unavailable, using NTP-adjusted CLOCK_MONOTONIC");
            libc::CLOCK_MONOTONIC
        }
    });

    fn zero() -> Timespec {
        libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        }
    }

    /// Clock used by the monotonic stopwatch backend.
    pub fn monotonic_clock() -> libc::clockid_t {
        *CLOCK
    }

    /// Read the monotonic clock.
    #[inline]
    pub fn monotonic_now() -> Timespec {
        let mut ts = zero();
        // SAFETY: `ts` is a valid, writable timespec and the clock id was
        // checked once at startup (or is CLOCK_MONOTONIC, which always exists).
        unsafe {
            libc::clock_gettime(monotonic_clock(), &mut ts);
        }
        ts
    }
}
