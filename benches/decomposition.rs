//! Decomposition benchmarks
//!
//! Measures the per-analysis cost of pivoting and decomposing a sweep grid.
//! Sweeps in practice are small (tens of cells); the larger grids bound the
//! cost of dense parameter scans.
//!
//! Run with: cargo bench --bench decomposition

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sweep_effects::decompose::{superposition_gamma_grid, two_way_decomposition};
use sweep_effects::experiment::{ExperimentKey, MetricRow};
use sweep_effects::matrix::ExperimentMatrix;

const GRID_SIZES: [u64; 3] = [4, 32, 256];

/// Deterministic value with both main effects and an interaction term
#[allow(clippy::cast_precision_loss)]
fn synthetic_value(i: u64, h: u64) -> f64 {
    let (x, y) = (i as f64, h as f64);
    5.0 - 0.01 * x - 0.02 * y + 0.0001 * x * y
}

fn synthetic_rows(size: u64) -> Vec<MetricRow> {
    (0..size)
        .flat_map(|i| (1..=size).map(move |h| (i * 10, h)))
        .map(|(i, h)| {
            MetricRow::builder("pg_ape_se3", ExperimentKey::new(i, h))
                .metric("rmse", synthetic_value(i, h))
                .build()
        })
        .collect()
}

fn bench_pivot(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot");

    for size in GRID_SIZES {
        let rows = synthetic_rows(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| ExperimentMatrix::pivot(black_box(rows), "rmse"));
        });
    }

    group.finish();
}

fn bench_two_way(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_way_decomposition");

    for size in GRID_SIZES {
        let matrix = ExperimentMatrix::pivot(&synthetic_rows(size), "rmse").unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &matrix, |b, m| {
            b.iter(|| two_way_decomposition(black_box(m)));
        });
    }

    group.finish();
}

fn bench_gamma_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("superposition_gamma_grid");

    for size in GRID_SIZES {
        let matrix = ExperimentMatrix::pivot(&synthetic_rows(size), "rmse").unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &matrix, |b, m| {
            b.iter(|| superposition_gamma_grid(black_box(m)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pivot, bench_two_way, bench_gamma_grid);
criterion_main!(benches);
