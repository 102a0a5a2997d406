//! Circuit evaluation benchmarks.
//!
//! Run with: cargo bench --bench evaluate
//!
//! The teacher crate's benches compared channel implementations head to
//! head; here there's only one evaluator, so these instead characterize how
//! evaluation cost scales with tree shape — wide `AND`s that short-circuit
//! immediately versus ones that must read every leaf.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use shortcircuit::{Circuit, CircuitSolver};

fn wide_and_all_true(width: usize) -> Arc<dyn shortcircuit::Node> {
    Circuit::and((0..width).map(|_| Circuit::leaf_value(true)).collect())
}

fn wide_and_first_false(width: usize) -> Arc<dyn shortcircuit::Node> {
    let mut children = vec![Circuit::leaf_value(false)];
    children.extend((1..width).map(|_| Circuit::leaf_value(true)));
    Circuit::and(children)
}

/// Lets `RUST_LOG` surface this crate's `tracing` spans while benchmarking.
/// First call wins; later ones are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().try_init();
}

fn bench_full_evaluation(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("and_all_true");
    for width in [2, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let solver = CircuitSolver::new();
            b.iter(|| {
                let handle = solver.solve(wide_and_all_true(width)).unwrap();
                handle.wait().unwrap()
            });
        });
    }
    group.finish();
}

fn bench_short_circuit(c: &mut Criterion) {
    init_tracing();
    let mut group = c.benchmark_group("and_short_circuits");
    for width in [2, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let solver = CircuitSolver::new();
            b.iter(|| {
                let handle = solver.solve(wide_and_first_false(width)).unwrap();
                handle.wait().unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_full_evaluation, bench_short_circuit);
criterion_main!(benches);
