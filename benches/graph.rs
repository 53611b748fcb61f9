//! Criterion benchmarks for graph construction, evaluation and backpropagation.
//!
//! Run with:
//!   cargo bench --bench graph

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use mll::graph::{parse, Dag, OpId};
use mll::{parse_args_from, run, GraphTransform};

/// Log loss of a logistic model over `dim` features, as infix source.
fn logreg_source(dim: usize) -> String {
    let mut eta = String::from("w0");
    for i in 1..=dim {
        eta.push_str(&format!(" + w{i} * x{i}"));
    }
    format!("-(y * log(1 / (1 + exp(-({eta})))) + (1 - y) * log(1 - 1 / (1 + exp(-({eta})))))")
}

fn build(dim: usize) -> (Dag, OpId) {
    let mut dag = Dag::new();
    let root = parse(&mut dag, &logreg_source(dim)).expect("benchmark source parses");
    (dag, root)
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");

    for &dim in &[2usize, 16, 64] {
        let src = logreg_source(dim);

        // ── parse + hash-consing ────────────────────────────────────────────
        group.bench_with_input(BenchmarkId::new("parse", dim), &src, |b, src| {
            b.iter(|| {
                let mut dag = Dag::new();
                parse(&mut dag, src).unwrap()
            })
        });

        // ── forward evaluation ──────────────────────────────────────────────
        let (dag, root) = build(dim);
        let values: Vec<f64> = (0..dag.free_vars(root).len()).map(|i| 0.1 * i as f64).collect();
        group.bench_with_input(BenchmarkId::new("eval", dim), &values, |b, values| {
            b.iter(|| dag.eval(root, values).unwrap().result())
        });

        // ── backpropagation ─────────────────────────────────────────────────
        group.bench_function(BenchmarkId::new("backwards", dim), |b| {
            b.iter_batched(
                || build(dim),
                |(mut dag, root)| dag.backwards(root).unwrap(),
                criterion::BatchSize::SmallInput,
            )
        });

        // ── gradient evaluation ─────────────────────────────────────────────
        let (mut dag, root) = build(dim);
        let g = dag.backwards(root).unwrap();
        group.bench_with_input(BenchmarkId::new("eval_gradient", dim), &values, |b, values| {
            b.iter(|| dag.eval(g, values).unwrap().results())
        });

        // ── harness round trip ──────────────────────────────────────────────
        let mut transform = GraphTransform::compile(&src, true).unwrap();
        let argv: Vec<String> = values
            .iter()
            .map(|v| v.to_string())
            .chain(std::iter::once("-b".to_string()))
            .collect();
        let args = parse_args_from(&argv);
        group.bench_function(BenchmarkId::new("harness", dim), |b| {
            let mut sink = Vec::with_capacity(4096);
            b.iter(|| {
                sink.clear();
                run(&args, &mut transform, &mut sink).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph);
criterion_main!(benches);
