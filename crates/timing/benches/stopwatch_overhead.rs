//! Stopwatch Overhead Benchmarks
//!
//! Measures the cost of one start/stop pair per backend. The kernels' timed
//! loop pays this once per round, so it bounds the shortest useful
//! `min_runtime`.
//!
//! Run with: cargo bench -p roofline-timing --bench stopwatch_overhead

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roofline_core::TimerBackend;
use roofline_timing::{read_cycles, stopwatch};

fn bench_start_stop(c: &mut Criterion) {
    let mut group = c.benchmark_group("stopwatch/start_stop");

    for backend in TimerBackend::ALL {
        group.bench_function(BenchmarkId::from_parameter(backend), |b| {
            let mut sw = stopwatch::create(backend);
            b.iter(|| {
                sw.start();
                sw.stop();
                black_box(sw.runtime())
            });
        });
    }

    group.finish();
}

fn bench_read_cycles(c: &mut Criterion) {
    c.bench_function("cycles/read", |b| b.iter(|| black_box(read_cycles())));
}

criterion_group!(benches, bench_start_stop, bench_read_cycles);
criterion_main!(benches);
