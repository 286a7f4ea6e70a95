//! Benchmarks for the transpilation pipeline
//!
//! Run with: cargo bench -p qtt

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qtt::TranspilationPipeline;
use qtt_hal::fake;
use qtt_ir::{Circuit, QubitId};

fn ring(n: u32) -> Circuit {
    let mut circuit = Circuit::ghz(n).unwrap();
    for q in 0..n {
        circuit.cx(QubitId(q), QubitId((q + 1) % n)).unwrap();
    }
    circuit
}

fn bench_attempts(c: &mut Criterion) {
    let mut group = c.benchmark_group("attempts");
    let circuit = ring(5);
    for k in &[1usize, 4, 16] {
        let pipeline = TranspilationPipeline::builder(Arc::new(fake::fake_lagos()))
            .with_optimization_level(2)
            .with_num_transpilations(*k)
            .with_seeds(0..*k as u64)
            .build();
        group.bench_with_input(BenchmarkId::new("ring5", k), &circuit, |b, circuit| {
            b.iter(|| pipeline.transpile_circuit(black_box(circuit)).unwrap());
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let circuit = Circuit::ghz(4).unwrap();
    let stages = [("plain", false, false), ("mapomatic", true, false), ("dd", false, true)];
    for (name, mapomatic, dd) in stages {
        let pipeline = TranspilationPipeline::builder(Arc::new(fake::fake_lagos()))
            .with_optimization_level(1)
            .with_seeds([7])
            .with_mapomatic(mapomatic)
            .with_dd(dd)
            .build();
        group.bench_function(name, |b| {
            b.iter(|| pipeline.transpile_circuit(black_box(&circuit)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_attempts, bench_stages);
criterion_main!(benches);
