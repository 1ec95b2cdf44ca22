//! End-to-end variable elimination benchmarks on generated chain networks.
//!
//! Run with:
//! - `cargo bench --bench elimination`

use baynet_core::{BayesianNetwork, NetworkBuilder, QueryRunner};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A chain `X0 -> X1 -> ... -> Xn-1` plus a noisy leaf hanging off every node.
fn make_chain(len: usize) -> BayesianNetwork {
    let mut builder = NetworkBuilder::new().name(format!("chain{}", len));
    for i in 0..len {
        builder = builder
            .variable(format!("X{}", i), ["T", "F"])
            .variable(format!("L{}", i), ["T", "F"]);
    }
    builder = builder.cpt("X0", [] as [&str; 0], [0.3, 0.7]);
    for i in 1..len {
        builder = builder.cpt(format!("X{}", i), [format!("X{}", i - 1)], [0.8, 0.2, 0.1, 0.9]);
    }
    for i in 0..len {
        builder = builder.cpt(format!("L{}", i), [format!("X{}", i)], [0.6, 0.4, 0.2, 0.8]);
    }
    builder.build().expect("chain network")
}

fn make_query(len: usize) -> String {
    let order: Vec<String> = (0..len - 1)
        .map(|i| format!("X{}", i))
        .chain((0..len - 1).map(|i| format!("L{}", i)))
        .collect();
    format!("P(X{}=T|L0=T) {}", len - 1, order.join("-"))
}

fn bench_chain_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("elimination_chain");
    for len in [4_usize, 16, 64] {
        let network = make_chain(len);
        let query = make_query(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &query, |b, query| {
            let runner = QueryRunner::new(&network);
            b.iter(|| black_box(runner.answer(black_box(query))));
        });
    }
    group.finish();
}

fn bench_independence(c: &mut Criterion) {
    let mut group = c.benchmark_group("bayes_ball_chain");
    for len in [16_usize, 64, 256] {
        let network = make_chain(len);
        let query = format!("X0-L{}|X{}", len - 1, len / 2);
        group.bench_with_input(BenchmarkId::from_parameter(len), &query, |b, query| {
            let runner = QueryRunner::new(&network);
            b.iter(|| black_box(runner.answer(black_box(query))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain_queries, bench_independence);
criterion_main!(benches);
