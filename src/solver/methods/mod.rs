//! Concrete equilibrium solvers
//!
//! This module contains the implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! ## Fixed-point (Neuman) iteration
//!
//! - **[`NeumanSolver`]**: nonlinear closure, direct `O(n²)` radial quadrature (1D/3D)
//! - **[`LinearNeumanSolver`]**: asymmetric closure `(1, 0, 0)`, direct quadrature (1D/3D)
//! - **[`TransformSolver`]**: nonlinear closure, same quadrature evaluated by FFT (1D/3D)
//! - **[`NaiveHankelSolver`]**: nonlinear closure, dense discrete Hankel transform (any D)
//!
//! ## Direct solution
//!
//! - **[`NystromSolver`]**: asymmetric closure, one dense LU solve (1D/3D)
//!
//! # Design Philosophy
//!
//! Each solver is a stateless unit struct. The shared fixed-point loop lives
//! in `solver::iteration`; a solver only picks the discretization and the
//! closure weights.

mod linear;
mod naive_hankel;
mod neuman;
mod nystrom;
mod transform;

pub use linear::LinearNeumanSolver;
pub use naive_hankel::NaiveHankelSolver;
pub use neuman::NeumanSolver;
pub use nystrom::NystromSolver;
pub use transform::TransformSolver;

use super::iteration::{ConvolutionScheme, Iterate};
use super::traits::EquilibriumResult;
use crate::model::{Closure, Problem};

/// Wrap a finished iteration into a result with the usual metadata.
fn assemble<S: ConvolutionScheme>(
    scheme: &S,
    iterate: Iterate,
    solver: &str,
    problem: &Problem,
    closure: &Closure,
) -> EquilibriumResult {
    let mut result = EquilibriumResult::new(iterate.c, iterate.n, scheme.step(), scheme.origin())
        .with_convergence(iterate.iterations, iterate.change);
    describe(&mut result, solver, problem, closure);
    result
}

fn describe(result: &mut EquilibriumResult, solver: &str, problem: &Problem, closure: &Closure) {
    result.add_metadata("solver", solver);
    result.add_metadata("dimension", problem.dimension().to_string());
    result.add_metadata("nodes", problem.nodes().to_string());
    result.add_metadata("radius", problem.radius().to_string());
    result.add_metadata(
        "closure",
        format!("{} {} {}", closure.alpha, closure.beta, closure.gamma),
    );
}
