//! Vector-length sweep
//!
//! Lengths grow geometrically from `vlen_start`, each step multiplied by
//! `vlen_scale` and rounded up, until the first length that reaches
//! `vlen_end`; that length is the last one run, so `8, x2, 100` visits
//! `8, 16, 32, 64, 128`. With `vlen_start == vlen_end` exactly one length
//! runs. Every length runs every selected kernel in registry order and
//! produces one [`SweepRow`].

use crate::ensemble::{EnsembleOutcome, TrialAggregate};
use crate::output::ResultSink;
use crate::trial::Engine;
use roofline_core::{Result, RooflineConfig, ThreadResult};
use roofline_kernels::KernelRegistry;
use roofline_timing::{calibrate, Calibration};
use serde::Serialize;
use tracing::{debug, info};

/// Geometric sequence of vector lengths.
#[derive(Debug, Clone)]
pub struct VectorLengths {
    next: Option<usize>,
    end: usize,
    scale: f64,
}

impl VectorLengths {
    /// Lengths from `start` by `scale` up to the first one `>= end`.
    ///
    /// `start` and `scale` are expected to have passed
    /// [`RooflineConfig::validate`].
    pub fn new(start: usize, end: usize, scale: f64) -> Self {
        VectorLengths {
            next: Some(start),
            end,
            scale,
        }
    }

    pub fn from_config(config: &RooflineConfig) -> Self {
        Self::new(config.vlen_start, config.vlen_end, config.vlen_scale)
    }
}

impl Iterator for VectorLengths {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = if current >= self.end {
            None
        } else {
            // Always advance, even when scale * n rounds back to n.
            let scaled = (current as f64 * self.scale).ceil();
            let bumped = current.checked_add(1);
            match bumped {
                Some(min) if scaled < usize::MAX as f64 => Some((scaled as usize).max(min)),
                Some(_) => Some(usize::MAX),
                None => None,
            }
        };
        Some(current)
    }
}

/// Best figures for one kernel at one vector length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelResult {
    /// Kernel display name
    pub kernel: String,
    /// Ensemble maxima
    pub best: TrialAggregate,
    /// Per-thread results of the last repetition
    pub threads: Vec<ThreadResult>,
}

impl KernelResult {
    fn from_outcome(kernel: &str, outcome: EnsembleOutcome) -> Self {
        KernelResult {
            kernel: kernel.to_string(),
            best: outcome.max,
            threads: outcome.threads,
        }
    }

    /// Best flop rate in GFLOP/s.
    pub fn gflops(&self) -> f64 {
        self.best.flop_rate * 1e-9
    }

    /// Best combined load and store bandwidth in GB/s.
    pub fn gbytes(&self) -> f64 {
        self.best.bandwidth() * 1e-9
    }
}

/// Results of every kernel at one vector length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    /// Elements per thread
    pub n: usize,
    /// Worker threads per trial
    pub threads: usize,
    /// One entry per kernel, registry order
    pub results: Vec<KernelResult>,
}

/// Everything a completed sweep produced.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub calibration: Calibration,
    pub rows: Vec<SweepRow>,
}

/// Drives the engine over all lengths and kernels.
#[derive(Debug)]
pub struct Sweep {
    config: RooflineConfig,
    registry: KernelRegistry,
    engine: Engine,
}

impl Sweep {
    /// Sweep over the kernels of `registry` selected by `config.kernels`.
    ///
    /// # Errors
    ///
    /// Returns [`roofline_core::Error::InvalidConfig`] for an invalid
    /// configuration or an unknown kernel name.
    pub fn new(config: RooflineConfig, registry: &KernelRegistry) -> Result<Self> {
        let engine = Engine::new(&config)?;
        Self::with_engine(config, registry, engine)
    }

    /// Sweep on a caller-built engine.
    pub fn with_engine(
        config: RooflineConfig,
        registry: &KernelRegistry,
        engine: Engine,
    ) -> Result<Self> {
        config.validate()?;
        let registry = registry.select(&config.kernels)?;
        Ok(Sweep {
            config,
            registry,
            engine,
        })
    }

    pub fn config(&self) -> &RooflineConfig {
        &self.config
    }

    /// The kernels this sweep runs, in order.
    pub fn registry(&self) -> &KernelRegistry {
        &self.registry
    }

    pub fn lengths(&self) -> VectorLengths {
        VectorLengths::from_config(&self.config)
    }

    /// Calibrate, then run every (length, kernel) pair and feed `sink`.
    ///
    /// # Errors
    ///
    /// Calibration, thread-spawn and sink errors end the sweep. Rows
    /// already handed to `sink` stay written.
    pub fn run(&mut self, sink: &mut dyn ResultSink) -> Result<SweepReport> {
        let calibration = calibrate(self.config.timer)?;
        let threads = self.engine.threads();
        info!(
            kernels = self.registry.len(),
            threads,
            ensembles = self.config.ensembles,
            timer = %self.config.timer,
            "starting sweep"
        );

        sink.begin(&self.registry.names())?;
        let mut rows = Vec::new();
        for n in VectorLengths::from_config(&self.config) {
            debug!(n, "vector length");
            let mut results = Vec::with_capacity(self.registry.len());
            for kernel in self.registry.iter() {
                let outcome = self.engine.run_ensemble(kernel, n)?;
                let result = KernelResult::from_outcome(&kernel.name, outcome);
                debug!(
                    kernel = %result.kernel,
                    n,
                    gflops = result.gflops(),
                    gbytes = result.gbytes(),
                    "kernel complete"
                );
                results.push(result);
            }
            let row = SweepRow {
                n,
                threads,
                results,
            };
            sink.record(&row)?;
            rows.push(row);
        }
        sink.finish()?;

        info!(lengths = rows.len(), "sweep complete");
        Ok(SweepReport { calibration, rows })
    }
}
