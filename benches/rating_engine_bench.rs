//! Benchmarks for the Elo-style rating solvers.
//!
//! These measure the bisection solver against the FFT-accelerated solver at
//! field sizes representative of a weekly contest (hundreds) and a large
//! biweekly contest (tens of thousands). All operations are pure Rust — no
//! database required.
//!
//! Run with: `cargo bench --bench rating_engine_bench`

use contest_predictor::rating::{RatingInput, elo, fft};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn synthetic_field(n: usize) -> RatingInput {
    let rank: Vec<f64> = (1..=n).map(|r| r as f64).collect();
    let rating: Vec<f64> = (0..n)
        .map(|i| 1200.0 + (i as f64) * (800.0 / n as f64))
        .collect();
    let attended_count: Vec<u32> = (0..n).map(|i| (i % 120) as u32).collect();
    RatingInput {
        rank,
        rating,
        attended_count,
    }
}

fn bench_bisection_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("elo_bisection");
    for &n in &[100usize, 1_000, 5_000] {
        let input = synthetic_field(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| black_box(elo::elo_delta(input)))
        });
    }
    group.finish();
}

fn bench_fft_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("elo_fft");
    for &n in &[100usize, 1_000, 5_000, 20_000] {
        let input = synthetic_field(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| black_box(fft::elo_delta(input)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bisection_solver, bench_fft_solver);
criterion_main!(benches);
