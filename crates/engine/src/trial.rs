//! Concurrent trial execution
//!
//! [`Engine`] owns the per-sweep resources (buffers, coordination context,
//! affinity collaborator) and runs one kernel at one vector length on all
//! configured threads:
//!
//! 1. reset the runtime flag and open a fresh start gate
//! 2. spawn `threads` scoped workers, each with its own buffer chunk
//! 3. open the gate once every worker exists, then join them all
//! 4. sum the per-thread results
//!
//! A worker panic abandons the trial barrier, so the other workers leave
//! their timed loops; the panic then propagates out of [`Engine::run_trial`]
//! once every worker has been joined.

use crate::buffers::Buffers;
use crate::ensemble::{EnsembleMax, EnsembleOutcome, TrialAggregate};
use crate::gate::StartGate;
use crate::topology::{usable_cores, Affinity, SchedAffinity};
use crate::worker::Worker;
use roofline_core::{
    Error, Kernel, KernelArgs, Result, RooflineConfig, ThreadResult, TimerBackend, TrialContext,
};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

/// Per-trial parameters taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSettings {
    pub threads: usize,
    pub ensembles: usize,
    pub min_runtime: f64,
    pub timer: TimerBackend,
    pub alpha: f32,
    pub beta: f32,
}

impl From<&RooflineConfig> for TrialSettings {
    fn from(config: &RooflineConfig) -> Self {
        TrialSettings {
            threads: config.threads,
            ensembles: config.ensembles,
            min_runtime: config.min_runtime,
            timer: config.timer,
            alpha: config.alpha,
            beta: config.beta,
        }
    }
}

/// Builds the [`thread::Builder`] for worker `tid`.
pub type ThreadBuilderFn = fn(tid: usize) -> thread::Builder;

/// Named worker threads with the default stack size.
pub fn default_thread_builder(tid: usize) -> thread::Builder {
    thread::Builder::new().name(format!("roofline-{}", tid))
}

/// Runs trials and ensembles on a fixed thread count.
pub struct Engine {
    settings: TrialSettings,
    thread_builder: ThreadBuilderFn,
    ctx: TrialContext,
    affinity: Arc<dyn Affinity>,
    cores: Vec<usize>,
    buffers: Buffers,
    slots: Vec<ThreadResult>,
}

impl Engine {
    /// Engine pinning through the OS onto this process's usable cores.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid or
    /// asks for more threads than there are usable cores.
    pub fn new(config: &RooflineConfig) -> Result<Self> {
        Self::with_affinity(config, Arc::new(SchedAffinity), usable_cores())
    }

    /// Engine with an explicit affinity collaborator and core list.
    ///
    /// Thread `tid` is pinned to `cores[tid]` in multi-threaded trials.
    pub fn with_affinity(
        config: &RooflineConfig,
        affinity: Arc<dyn Affinity>,
        cores: Vec<usize>,
    ) -> Result<Self> {
        config.validate()?;
        config.validate_cores(cores.len())?;
        let settings = TrialSettings::from(config);
        debug!(
            threads = settings.threads,
            ensembles = settings.ensembles,
            timer = %settings.timer,
            "engine ready"
        );
        Ok(Engine {
            thread_builder: default_thread_builder,
            ctx: TrialContext::new(settings.threads),
            slots: vec![ThreadResult::default(); settings.threads],
            buffers: Buffers::new(),
            settings,
            affinity,
            cores,
        })
    }

    /// Replace how worker threads are configured (name, stack size).
    pub fn with_thread_builder(mut self, thread_builder: ThreadBuilderFn) -> Self {
        self.thread_builder = thread_builder;
        self
    }

    pub fn settings(&self) -> &TrialSettings {
        &self.settings
    }

    pub fn threads(&self) -> usize {
        self.settings.threads
    }

    /// Per-thread results of the most recent trial.
    pub fn thread_results(&self) -> &[ThreadResult] {
        &self.slots
    }

    /// Run `kernel` once on every thread with `n` elements per thread.
    ///
    /// `y` keeps whatever the previous trial left in it; use
    /// [`Engine::run_ensemble`] for a fresh start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for `n == 0` and
    /// [`Error::ThreadSpawn`] if a worker cannot be started. In the latter
    /// case workers already started exit without running the kernel.
    pub fn run_trial(&mut self, kernel: &Kernel, n: usize) -> Result<TrialAggregate> {
        if n == 0 {
            return Err(Error::invalid_config("vector length must be at least 1"));
        }
        let threads = self.settings.threads;
        self.buffers.ensure(n, threads);
        self.ctx.reset();
        self.slots.fill(ThreadResult::default());

        let settings = self.settings;
        let ctx = &self.ctx;
        let affinity: &dyn Affinity = &*self.affinity;
        let cores = &self.cores;
        let chunks = self.buffers.chunks(n, threads);
        let slots = &mut self.slots;
        let thread_builder = self.thread_builder;
        let gate = StartGate::new();

        thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(threads);
            for (tid, ((x, y), slot)) in chunks.into_iter().zip(slots.iter_mut()).enumerate() {
                let worker = Worker {
                    kernel,
                    args: KernelArgs {
                        tid,
                        n,
                        a: settings.alpha,
                        b: settings.beta,
                        x,
                        y,
                        min_runtime: settings.min_runtime,
                        timer: settings.timer,
                        roof: kernel.roof,
                        ctx,
                    },
                    gate: &gate,
                    pin: (threads > 1).then(|| (affinity, cores[tid])),
                };
                let spawned =
                    thread_builder(tid).spawn_scoped(scope, move || worker.run(slot));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        warn!(tid, error = %source, "worker spawn failed, abandoning trial");
                        gate.abort();
                        return Err(Error::ThreadSpawn {
                            thread: tid,
                            source,
                        });
                    }
                }
            }

            gate.open();
            let mut panic = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic.get_or_insert(payload);
                }
            }
            if let Some(payload) = panic {
                std::panic::resume_unwind(payload);
            }
            Ok(())
        })?;

        let aggregate = TrialAggregate::sum(&self.slots);
        trace!(kernel = %kernel.name, n, flops = aggregate.flops, "trial complete");
        Ok(aggregate)
    }

    /// Run `ensembles` trials of `kernel` at length `n` and keep the maxima.
    ///
    /// `y` is reset to zero before the first trial.
    pub fn run_ensemble(&mut self, kernel: &Kernel, n: usize) -> Result<EnsembleOutcome> {
        self.buffers.prepare(n, self.settings.threads);
        let mut best = EnsembleMax::new();
        let mut repetitions = Vec::with_capacity(self.settings.ensembles);
        for rep in 0..self.settings.ensembles {
            let aggregate = self.run_trial(kernel, n)?;
            let running = best.observe(&aggregate);
            debug!(
                kernel = %kernel.name,
                n,
                rep,
                gflops = aggregate.flop_rate * 1e-9,
                best_gflops = running.flop_rate * 1e-9,
                "repetition complete"
            );
            repetitions.push(aggregate);
        }
        Ok(EnsembleOutcome {
            max: best.value(),
            repetitions,
            threads: self.slots.clone(),
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("cores", &self.cores)
            .field("buffers", &self.buffers)
            .finish_non_exhaustive()
    }
}
