//! Roofline - a roofline-model microbenchmark harness
//!
//! Measures sustained floating-point throughput and memory bandwidth of
//! compute kernels across a geometric sweep of working-set sizes, on
//! multi-threaded, CPU-pinned workers timed by a calibrated stopwatch.
//!
//! # Quick Start
//!
//! ```ignore
//! use roofline::{open_sinks, KernelRegistry, RooflineConfig, Sweep};
//!
//! let config = RooflineConfig::from_toml_str("threads = 2\nvlen_end = 4096")?;
//! let mut sinks = open_sinks(&config)?;
//! let mut sweep = Sweep::new(config, &KernelRegistry::standard())?;
//! let report = sweep.run(&mut sinks)?;
//! ```
//!
//! # Architecture
//!
//! Sweep -> Engine (ensembles of trials) -> worker threads -> Stopwatch,
//! with results flowing back up into a [`ResultSink`].

pub use roofline_core::*;
pub use roofline_engine::*;
pub use roofline_kernels::{KernelRegistry, TimedRound};
pub use roofline_timing::{calibrate, Calibration, RevUp, Stopwatch};

/// Kernel implementations and the timed loop.
pub mod kernels {
    pub use roofline_kernels::*;
}

/// Stopwatch backends and calibration.
pub mod timing {
    pub use roofline_timing::*;
}
