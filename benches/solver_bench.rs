//! Benchmarks for the flexure solver

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;

use flexure_solver::flexure::{fd, spa, SpatialDomainVars};
use flexure_solver::prelude::*;

fn point_load(n: usize) -> DMatrix<f64> {
    let mut q0 = DMatrix::zeros(n, n);
    q0[(n / 2, n / 2)] = 1e6;
    q0
}

fn varying_thickness(n: usize) -> ElasticParameters {
    let te = DMatrix::from_fn(n, n, |j, i| 10_000.0 + 200.0 * (i + j) as f64);
    ElasticParameters::new(Thickness::Field(te), 3300.0)
}

fn benchmark_assembly(c: &mut Criterion) {
    let n = 100;
    let grid = Grid::new(5000.0, 5000.0, n, n);
    let params = varying_thickness(n);
    c.bench_function("fd_assembly_100x100", |b| {
        b.iter(|| {
            let coeff = fd::build_operator(&grid, &params).unwrap();
            black_box(coeff);
        })
    });
}

fn benchmark_fd_solve(c: &mut Criterion) {
    let n = 60;
    let grid = Grid::new(5000.0, 5000.0, n, n);
    let params = varying_thickness(n);
    let q0 = point_load(n);
    c.bench_function("fd_solve_60x60", |b| {
        b.iter(|| {
            let w = fd::solve(&grid, &params, &q0).unwrap();
            black_box(w);
        })
    });
}

fn benchmark_fd_rerun(c: &mut Criterion) {
    let n = 60;
    let mut model = FlexureModel::new(5000.0, 5000.0, varying_thickness(n), point_load(n), Method::Fd).unwrap();
    model.run().unwrap();
    c.bench_function("fd_rerun_60x60", |b| {
        b.iter(|| {
            model.rerun(point_load(n)).unwrap();
            black_box(model.deflection().unwrap());
        })
    });
}

fn benchmark_spa_gridded(c: &mut Criterion) {
    let n = 60;
    let grid = Grid::new(5000.0, 5000.0, n, n);
    let vars = SpatialDomainVars::new(&ElasticParameters::uniform(20_000.0, 3300.0)).unwrap();
    let q0 = DMatrix::from_fn(n, n, |j, i| if (20..40).contains(&j) && (20..40).contains(&i) { 1e4 } else { 0.0 });
    c.bench_function("spa_gridded_60x60_block", |b| {
        b.iter(|| {
            let w = spa::spatial_domain_gridded(&grid, &vars, &q0).unwrap();
            black_box(w);
        })
    });
}

criterion_group!(
    benches,
    benchmark_assembly,
    benchmark_fd_solve,
    benchmark_fd_rerun,
    benchmark_spa_gridded,
);

criterion_main!(benches);
