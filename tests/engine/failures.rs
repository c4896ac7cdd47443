//! Failure paths: a panicking kernel and a worker that cannot be spawned.
//!
//! Each trial runs on a helper thread so a regression shows up as a
//! timeout instead of a hung test binary.

use crate::common::{engine_with_stub, quick_config};
use roofline::{
    Error, Kernel, KernelArgs, KernelRegistry, Result, ResultSink, RooflineConfig, Sweep,
    SweepRow, ThreadResult, TrialAggregate,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(10);

/// Thread 1 fails; thread 0 waits for it at the trial barrier.
fn flaky(args: &mut KernelArgs<'_>) -> ThreadResult {
    if args.tid == 1 {
        panic!("kernel failed on thread 1");
    }
    args.ctx.barrier().wait();
    ThreadResult::default()
}

/// A stack no system can map, for every worker after the first.
#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
fn unspawnable_after_first(tid: usize) -> thread::Builder {
    let builder = thread::Builder::new().name(format!("roofline-{}", tid));
    if tid >= 1 {
        builder.stack_size(1 << 50)
    } else {
        builder
    }
}

fn run_with_deadline<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(DEADLINE)
        .expect("trial did not finish before the deadline")
}

#[test]
fn kernel_panic_fails_trial_without_hanging() {
    let (mut engine, _) = engine_with_stub(&quick_config(2, 1));

    let (panicked, next) = run_with_deadline(move || {
        let kernel = Kernel::new("flaky", flaky);
        let panicked =
            panic::catch_unwind(AssertUnwindSafe(|| engine.run_trial(&kernel, 16))).is_err();
        // the engine is reusable after a failed trial
        let registry = KernelRegistry::standard();
        let next = engine.run_trial(registry.get("copy").unwrap(), 16);
        (panicked, next.map(|agg| agg.bytes_stored))
    });

    assert!(panicked);
    assert!(next.unwrap() > 0);
}

#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
#[test]
fn spawn_failure_reports_thread_and_releases_started_workers() {
    let (engine, _) = engine_with_stub(&quick_config(3, 1));
    let mut engine = engine.with_thread_builder(unspawnable_after_first);

    let result: Result<TrialAggregate> = run_with_deadline(move || {
        let registry = KernelRegistry::standard();
        engine.run_trial(registry.get("axpy").unwrap(), 64)
    });

    match result {
        Err(Error::ThreadSpawn { thread, .. }) => assert_eq!(thread, 1),
        other => panic!("expected ThreadSpawn, got {:?}", other),
    }
}

/// Sink that counts what it was given.
#[derive(Default)]
struct CountingSink {
    begun: bool,
    rows: Vec<usize>,
    finished: bool,
}

impl ResultSink for CountingSink {
    fn begin(&mut self, _kernels: &[&str]) -> Result<()> {
        self.begun = true;
        Ok(())
    }

    fn record(&mut self, row: &SweepRow) -> Result<()> {
        self.rows.push(row.n);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
#[test]
fn spawn_failure_stops_sweep_before_any_row() {
    let config = RooflineConfig {
        vlen_start: 8,
        vlen_end: 64,
        kernels: vec!["copy".into(), "axpy".into()],
        ..quick_config(2, 1)
    };
    let (engine, _) = engine_with_stub(&config);
    let engine = engine.with_thread_builder(unspawnable_after_first);

    let (result, sink) = run_with_deadline(move || {
        let mut sweep = Sweep::with_engine(config, &KernelRegistry::standard(), engine).unwrap();
        let mut sink = CountingSink::default();
        let result = sweep.run(&mut sink).map(|report| report.rows.len());
        (result, sink)
    });

    assert!(matches!(result, Err(Error::ThreadSpawn { thread: 1, .. })));
    assert!(sink.begun);
    assert!(sink.rows.is_empty());
    assert!(!sink.finished);
}
