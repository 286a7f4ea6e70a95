//! Benchmarks for circuit construction and metrics
//!
//! Run with: cargo bench -p qtt-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qtt_ir::{Circuit, QubitId};

fn layered_circuit(n: u32, layers: u32) -> Circuit {
    let mut circuit = Circuit::with_size("bench", n, 0);
    for layer in 0..layers {
        for q in 0..n {
            circuit
                .rz(f64::from(layer) * 0.1, QubitId(q))
                .unwrap()
                .sx(QubitId(q))
                .unwrap();
        }
        for q in (layer % 2..n.saturating_sub(1)).step_by(2) {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    for n in &[5u32, 20, 50] {
        group.bench_with_input(BenchmarkId::new("layered", n), n, |b, &n| {
            b.iter(|| layered_circuit(black_box(n), 10));
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    for n in &[5u32, 20, 50] {
        let circuit = layered_circuit(*n, 20);
        group.bench_with_input(BenchmarkId::new("depth", n), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit.depth()));
        });
        group.bench_with_input(BenchmarkId::new("count_ops", n), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit.count_ops()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_construction, bench_metrics);
criterion_main!(benches);
