//! Core types for the roofline harness
//!
//! This crate defines the foundational types shared by every layer:
//! - Error: Error type hierarchy
//! - RooflineConfig: Immutable sweep configuration (TOML)
//! - TimerBackend: Stopwatch backend selector
//! - TrialBarrier: Abandonable barrier for trial workers
//! - Kernel contract: KernelArgs, KernelFn, Kernel, ThreadResult, RoofCost, TrialContext

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod config;
pub mod contract;
pub mod error;
pub mod timer;

pub use barrier::TrialBarrier;
pub use config::{OutputFormat, RooflineConfig, CONFIG_FILE_NAME};
pub use contract::{
    Kernel, KernelArgs, KernelFn, Roof, RoofCost, RoofCostFn, RoofOp, ThreadResult, TrialContext,
    ELEMENT_BYTES,
};
pub use error::{Error, Result};
pub use timer::TimerBackend;
