//! Timing layer for the roofline harness
//!
//! This crate provides:
//! - Stopwatch: one interface over the std, monotonic-raw and cycle-counter clocks
//! - Cycle counter access and the process-wide calibrated frequency
//! - Calibration: CPU frequency rev-up and cycle-counter calibration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calibrate;
pub mod cycles;
pub mod stopwatch;

pub use calibrate::{calibrate, Calibration, RevUp};
pub use cycles::{cycle_frequency, cycle_frequency_or_nominal, read_cycles};
pub use stopwatch::{create, CycleStopwatch, PosixStopwatch, StdStopwatch, Stopwatch};
