//! Benchmarks for the factor algebra kernels.
//!
//! Run with:
//! - `cargo bench --bench factor_kernels`

use baynet_core::engine::factor::{Assignment, Factor, OpCounter};
use baynet_core::VarId;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn make_values(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = ((state >> 11) as f64) / ((u64::MAX >> 11) as f64);
        out.push(0.001 + unit);
    }
    out
}

/// Full binary factor over `vars`, first variable varying slowest.
fn make_factor(vars: &[VarId], seed: u64) -> Factor {
    let n = vars.len();
    let values = make_values(1 << n, seed);
    let rows = values.into_iter().enumerate().map(|(i, v)| {
        let key: Assignment = (0..n).map(|pos| ((i >> (n - 1 - pos)) & 1) as u16).collect();
        (key, v)
    });
    Factor::new(vars.iter().copied(), rows).expect("bench factor")
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_multiply");
    for width in [2_u32, 4, 6, 8] {
        // Two factors of `width` variables overlapping on half of them
        let left: Vec<VarId> = (0..width).map(VarId).collect();
        let right: Vec<VarId> = (width / 2..width + width / 2).map(VarId).collect();
        let f = make_factor(&left, 1);
        let g = make_factor(&right, 2);
        group.bench_with_input(BenchmarkId::from_parameter(width), &(f, g), |b, (f, g)| {
            b.iter(|| {
                let mut counter = OpCounter::new();
                black_box(black_box(f).multiply(black_box(g), &mut counter))
            });
        });
    }
    group.finish();
}

fn bench_sum_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("factor_sum_out");
    for width in [2_u32, 4, 8, 12] {
        let vars: Vec<VarId> = (0..width).map(VarId).collect();
        let f = make_factor(&vars, 3);
        let target = VarId(width / 2);
        group.bench_with_input(BenchmarkId::from_parameter(width), &f, |b, f| {
            b.iter(|| {
                let mut counter = OpCounter::new();
                black_box(f.sum_out(black_box(target), &mut counter))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_multiply, bench_sum_out);
criterion_main!(benches);
