//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use parking_lot::Mutex;
use roofline::{Affinity, Engine, Result, RooflineConfig, TimerBackend};
use std::sync::Arc;

/// Affinity stub that records every pin request instead of pinning.
#[derive(Debug, Default)]
pub struct RecordingAffinity {
    calls: Mutex<Vec<usize>>,
}

impl RecordingAffinity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Cores requested so far, sorted.
    pub fn pinned(&self) -> Vec<usize> {
        let mut calls = self.calls.lock().clone();
        calls.sort_unstable();
        calls
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Affinity for RecordingAffinity {
    fn pin_current(&self, core: usize) -> Result<()> {
        self.calls.lock().push(core);
        Ok(())
    }
}

/// A short, portable configuration for `threads` workers.
pub fn quick_config(threads: usize, ensembles: usize) -> RooflineConfig {
    RooflineConfig {
        threads,
        ensembles,
        min_runtime: 0.002,
        timer: TimerBackend::Std,
        ..RooflineConfig::default()
    }
}

/// Engine over `0..threads` fake cores with a recording affinity stub.
pub fn engine_with_stub(config: &RooflineConfig) -> (Engine, Arc<RecordingAffinity>) {
    let affinity = RecordingAffinity::new();
    let cores = (0..config.threads).collect();
    let engine = Engine::with_affinity(config, affinity.clone(), cores).unwrap();
    (engine, affinity)
}
