//! Full trial, ensemble and sweep runs on real threads.

use crate::common::{engine_with_stub, quick_config, RecordingAffinity};
use roofline::{
    ConsoleSink, Engine, KernelRegistry, RooflineConfig, Sweep, TimerBackend, ELEMENT_BYTES,
};

#[test]
fn axpy_four_threads_three_repetitions() {
    let registry = KernelRegistry::standard();
    let axpy = registry.get("axpy").unwrap();
    let config = RooflineConfig {
        min_runtime: 0.01,
        ..quick_config(4, 3)
    };
    let (mut engine, _) = engine_with_stub(&config);

    let outcome = engine.run_ensemble(axpy, 1024).unwrap();

    let threads = &outcome.threads;
    assert_eq!(threads.len(), 4);
    let expected: u64 = threads.iter().map(|t| 2 * 1024 * t.reps).sum();
    assert_eq!(outcome.repetitions.last().unwrap().flops, expected);
    // the loop ends in the first round where some thread met the minimum
    assert!(threads.iter().any(|t| t.runtime >= 0.01));
    assert!(threads.iter().all(|t| t.reps == threads[0].reps));

    assert_eq!(outcome.repetitions.len(), 3);
    let largest = outcome.repetitions.iter().map(|r| r.flops).max().unwrap();
    assert_eq!(outcome.max.flops, largest);
    let best_rate = outcome
        .repetitions
        .iter()
        .map(|r| r.flop_rate)
        .fold(0.0, f64::max);
    assert_eq!(outcome.max.flop_rate, best_rate);
}

#[test]
fn copy_moves_eight_bytes_per_element_and_no_flops() {
    let registry = KernelRegistry::standard();
    let (mut engine, _) = engine_with_stub(&quick_config(2, 1));
    let agg = engine
        .run_trial(registry.get("copy").unwrap(), 1000)
        .unwrap();

    let reps: u64 = engine.thread_results().iter().map(|t| t.reps).sum();
    assert_eq!(agg.flops, 0);
    assert_eq!(agg.bytes_loaded, 1000 * ELEMENT_BYTES * reps);
    assert_eq!(agg.bytes_stored, 1000 * ELEMENT_BYTES * reps);
    assert!(agg.load_bandwidth > 0.0);
}

#[test]
fn peak_kernels_report_flops_without_traffic() {
    let registry = KernelRegistry::standard();
    let (mut engine, _) = engine_with_stub(&quick_config(1, 1));
    let agg = engine
        .run_trial(registry.get("peak_mac").unwrap(), 16)
        .unwrap();
    assert!(agg.flops > 0);
    assert_eq!(agg.bandwidth(), 0.0);
}

#[test]
fn too_many_threads_is_a_config_error() {
    let config = quick_config(8, 1);
    let result = Engine::with_affinity(&config, RecordingAffinity::new(), vec![0, 1]);
    assert!(result.is_err());
}

#[test]
fn small_sweep_produces_one_row_per_length() {
    let config = RooflineConfig {
        vlen_start: 8,
        vlen_end: 100,
        vlen_scale: 2.0,
        kernels: vec!["copy".into(), "axpy".into()],
        ..quick_config(2, 1)
    };
    let (engine, _) = engine_with_stub(&config);
    let mut sweep = Sweep::with_engine(config, &KernelRegistry::standard(), engine).unwrap();
    let mut console = ConsoleSink::new(Vec::new(), false);

    let report = sweep.run(&mut console).unwrap();

    let lengths: Vec<_> = report.rows.iter().map(|r| r.n).collect();
    assert_eq!(lengths, vec![8, 16, 32, 64, 128]);
    for row in &report.rows {
        let names: Vec<_> = row.results.iter().map(|r| r.kernel.as_str()).collect();
        assert_eq!(names, vec!["copy", "axpy"]);
        assert_eq!(row.threads, 2);
    }
    assert_eq!(report.calibration.backend, TimerBackend::Std);
    assert!(report.calibration.revup.is_some());

    let text = String::from_utf8(console.into_inner()).unwrap();
    assert_eq!(text.matches("axpy GFLOP/s").count(), 5);
}
