//! Performance benchmarks for the equilibrium solvers
//!
//! # What We're Measuring
//!
//! 1. **Direct vs FFT quadrature**: the nonlinear Neuman iteration with
//!    `O(n²)` convolutions against the same iteration with `O(n log n)` FFT
//!    convolutions. Both reach the same fixed point, so the ratio is the
//!    pure cost of the convolution backend.
//!
//! 2. **Nystrom**: one dense LU solve, `O(n³)`.
//!
//! 3. **Naive Hankel**: dense `O(n²)` transforms, any dimension.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench --bench solver_performance
//!
//! # Only the quadrature comparison
//! cargo bench --bench solver_performance quadrature
//!
//! # With Rayon for the direct sums
//! cargo bench --bench solver_performance --features parallel
//! ```
//!
//! # Expected Results
//!
//! The FFT solver overtakes the direct one somewhere around a few hundred
//! nodes; below that the transform setup dominates.

use criterion::{BenchmarkId, Criterion, SamplingMode, criterion_group, criterion_main};
use moment_rs::kernels::KernelShape;
use moment_rs::model::{Problem, Radius};
use moment_rs::solver::{NaiveHankelSolver, NeumanSolver, NystromSolver, Solver, TransformSolver};
use std::hint::black_box;
use std::time::Duration;

fn problem(dimension: usize, nodes: usize) -> Problem {
    Problem::builder()
        .dimension(dimension)
        .rates(1.0, 0.5, 0.1)
        .kernels(KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 })
        .radius(Radius::Fixed(10.0))
        .nodes(nodes)
        .iterations(50)
        .build()
        .expect("benchmark problem is valid")
}

/// Direct and FFT quadrature on the same nonlinear problem.
fn benchmark_quadrature(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadrature");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(10));

    for nodes in [64, 256, 1024] {
        for dimension in [1, 3] {
            let problem = problem(dimension, nodes);
            let id = format!("{dimension}D/{nodes}");

            group.bench_with_input(BenchmarkId::new("direct", &id), &problem, |b, problem| {
                let solver = NeumanSolver::new();
                b.iter(|| solver.solve(black_box(problem)).unwrap())
            });

            group.bench_with_input(BenchmarkId::new("fft", &id), &problem, |b, problem| {
                let solver = TransformSolver::new();
                b.iter(|| solver.solve(black_box(problem)).unwrap())
            });
        }
    }

    group.finish();
}

/// Dense LU solve of the linearized equation.
fn benchmark_nystrom(c: &mut Criterion) {
    let mut group = c.benchmark_group("nystrom");

    for nodes in [64, 256, 512] {
        let problem = problem(1, nodes);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &problem, |b, problem| {
            let solver = NystromSolver::new();
            b.iter(|| solver.solve(black_box(problem)).unwrap())
        });
    }

    group.finish();
}

/// Dense Hankel transforms in dimensions without a fast path.
fn benchmark_hankel(c: &mut Criterion) {
    let mut group = c.benchmark_group("hankel");

    for dimension in [2, 4] {
        let problem = problem(dimension, 128);
        group.bench_with_input(BenchmarkId::from_parameter(dimension), &problem, |b, problem| {
            let solver = NaiveHankelSolver::new();
            b.iter(|| solver.solve(black_box(problem)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_quadrature, benchmark_nystrom, benchmark_hankel);
criterion_main!(benches);
