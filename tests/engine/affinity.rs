//! Pinning behaviour against a recording affinity stub.

use crate::common::{engine_with_stub, quick_config};
use roofline::KernelRegistry;

#[test]
fn single_thread_is_never_pinned() {
    let registry = KernelRegistry::standard();
    let (mut engine, affinity) = engine_with_stub(&quick_config(1, 2));
    engine
        .run_ensemble(registry.get("copy").unwrap(), 256)
        .unwrap();
    assert_eq!(affinity.count(), 0);
}

#[test]
fn each_thread_pinned_once_per_trial() {
    let registry = KernelRegistry::standard();
    let (mut engine, affinity) = engine_with_stub(&quick_config(4, 1));
    engine.run_trial(registry.get("axpy").unwrap(), 256).unwrap();
    assert_eq!(affinity.pinned(), vec![0, 1, 2, 3]);
}

#[test]
fn pin_calls_scale_with_repetitions() {
    let registry = KernelRegistry::standard();
    let (mut engine, affinity) = engine_with_stub(&quick_config(2, 3));
    engine
        .run_ensemble(registry.get("xpy").unwrap(), 128)
        .unwrap();
    assert_eq!(affinity.pinned(), vec![0, 0, 0, 1, 1, 1]);
}
