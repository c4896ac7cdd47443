//! Measurement engine for the roofline harness
//!
//! This crate runs kernels on pinned worker threads and collects results:
//! - Engine: one trial on N threads, ensembles of trials with max aggregation
//! - Sweep: geometric vector-length sweep over the kernel registry
//! - Topology: usable cores and affinity pinning
//! - Output: CSV, JSON-lines and console result sinks
//!
//! Per-sweep coordination state (barrier, runtime flag, start gate) lives in
//! the [`Engine`]; nothing here is process-global.

#![warn(clippy::all)]

pub mod buffers;
pub mod ensemble;
pub mod gate;
pub mod output;
pub mod sweep;
pub mod topology;
pub mod trial;
mod worker;

pub use ensemble::{EnsembleMax, EnsembleOutcome, TrialAggregate};
pub use output::{
    file_sink, open_sinks, ConsoleSink, CsvSink, JsonLinesSink, ResultSink, SinkSet,
};
pub use sweep::{KernelResult, Sweep, SweepReport, SweepRow, VectorLengths};
pub use topology::{usable_cores, Affinity, SchedAffinity};
pub use trial::{default_thread_builder, Engine, ThreadBuilderFn, TrialSettings};
