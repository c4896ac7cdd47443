//! Benchmark kernels for the roofline harness
//!
//! - `timed`: the adaptive, barrier-synchronized loop every kernel runs
//! - `axpy`: vector operations with their flop and traffic accounting
//! - `peak`: register-resident compute kernels
//! - `registry`: the ordered kernel table consumed by the sweep

#![warn(clippy::all)]

pub mod axpy;
pub mod peak;
pub mod registry;
pub mod timed;

pub use registry::KernelRegistry;
pub use timed::{roof_thread, timed_loop, TimedRound};
