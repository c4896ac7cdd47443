//! Engine integration tests: trials, ensembles, sweeps and sinks.

#[path = "../common/mod.rs"]
mod common;

mod affinity;
mod end_to_end;
mod ensemble_max;
mod failures;
mod sinks;
mod sweep_order;
