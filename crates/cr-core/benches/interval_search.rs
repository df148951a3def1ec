//! Criterion benchmarks for the `cr-core` inference hot paths.
//!
//! The HPDI search is quadratic in grid size; the two-test sweep is cubic.

use cr_core::inference::{
    update, CaptureStage, Grid, IntervalFinder, TwoTestSweep, TwoTestTable,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_interval_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("interval");

    for points in [200i64, 1_000, 4_000] {
        let grid = Grid::integers(1, points).unwrap();
        let prior = vec![1.0; grid.len()];
        let posterior = update(&grid, &prior, &CaptureStage::new(14, 12, 2).likelihood()).unwrap();
        let density = posterior.densities(&grid);

        group.bench_with_input(
            BenchmarkId::new("hpdi_95", points),
            &density,
            |b, density| {
                b.iter(|| {
                    IntervalFinder::new()
                        .find(black_box(grid.values()), black_box(density), 0.95)
                        .ok()
                });
            },
        );
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let grid = Grid::integers(1, 5_000).unwrap();
    let prior = vec![1.0; grid.len()];
    let likelihood = CaptureStage::new(14, 12, 2).likelihood();

    c.bench_function("posterior/update_5000", |b| {
        b.iter(|| update(black_box(&grid), black_box(&prior), &likelihood).ok());
    });
}

fn bench_two_test_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_test");
    let table = TwoTestTable::new(10, 2, 2);

    for detection_points in [11usize, 21] {
        let population = Grid::integers(1, 200).unwrap();
        let detection = Grid::linspace(0.0, 1.0, detection_points).unwrap();
        let flat_n = vec![1.0; population.len()];
        let flat_p = vec![1.0; detection.len()];
        let sweep = TwoTestSweep {
            population: &population,
            population_prior: &flat_n,
            detection: &detection,
            p1_prior: &flat_p,
            p2_prior: &flat_p,
        };

        group.bench_with_input(
            BenchmarkId::new("sweep", detection_points),
            &sweep,
            |b, sweep| {
                b.iter(|| sweep.run(black_box(&table)).ok());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_interval_search,
    bench_update,
    bench_two_test_sweep
);
criterion_main!(benches);
