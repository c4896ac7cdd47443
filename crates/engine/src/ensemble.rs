//! Trial aggregation and ensemble maxima
//!
//! A trial's per-thread results are summed into one [`TrialAggregate`];
//! an ensemble keeps the element-wise maximum of its trials' aggregates.

use roofline_core::ThreadResult;
use serde::Serialize;

/// Sum of one trial's per-thread results.
///
/// Rates are summed per thread rather than derived from the summed
/// totals, so a straggler thread does not dilute the others' throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrialAggregate {
    /// Floating-point operations across threads
    pub flops: u64,
    /// Bytes read across threads
    pub bytes_loaded: u64,
    /// Bytes written across threads
    pub bytes_stored: u64,
    /// FLOP/s summed over threads
    pub flop_rate: f64,
    /// Load bandwidth in bytes/s summed over threads
    pub load_bandwidth: f64,
    /// Store bandwidth in bytes/s summed over threads
    pub store_bandwidth: f64,
}

impl TrialAggregate {
    /// Aggregate a trial's thread results.
    pub fn sum(results: &[ThreadResult]) -> Self {
        results.iter().fold(Self::default(), |acc, r| TrialAggregate {
            flops: acc.flops + r.flops,
            bytes_loaded: acc.bytes_loaded + r.bytes_loaded,
            bytes_stored: acc.bytes_stored + r.bytes_stored,
            flop_rate: acc.flop_rate + r.flop_rate(),
            load_bandwidth: acc.load_bandwidth + r.load_bandwidth(),
            store_bandwidth: acc.store_bandwidth + r.store_bandwidth(),
        })
    }

    /// Element-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        TrialAggregate {
            flops: self.flops.max(other.flops),
            bytes_loaded: self.bytes_loaded.max(other.bytes_loaded),
            bytes_stored: self.bytes_stored.max(other.bytes_stored),
            flop_rate: self.flop_rate.max(other.flop_rate),
            load_bandwidth: self.load_bandwidth.max(other.load_bandwidth),
            store_bandwidth: self.store_bandwidth.max(other.store_bandwidth),
        }
    }

    /// Combined load and store bandwidth in bytes/s.
    pub fn bandwidth(&self) -> f64 {
        self.load_bandwidth + self.store_bandwidth
    }
}

/// Running element-wise maximum over an ensemble's trials.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsembleMax {
    best: TrialAggregate,
    count: usize,
}

impl EnsembleMax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one trial and return the maximum so far.
    pub fn observe(&mut self, trial: &TrialAggregate) -> TrialAggregate {
        self.best = self.best.max(trial);
        self.count += 1;
        self.best
    }

    /// Maximum over everything observed; all zero before the first trial.
    pub fn value(&self) -> TrialAggregate {
        self.best
    }

    /// Trials observed
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Everything one ensemble produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutcome {
    /// Element-wise maximum over repetitions
    pub max: TrialAggregate,
    /// Each repetition's aggregate, in run order
    pub repetitions: Vec<TrialAggregate>,
    /// Per-thread results of the last repetition
    pub threads: Vec<ThreadResult>,
}
