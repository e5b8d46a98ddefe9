//! Nystrom solver
//!
//! # Mathematical Background
//!
//! Under the asymmetric closure the pair equation is linear in `Q`:
//!
//! ```text
//! (b + s w(x)) Q(x) - b (m*Q)(x) = N (b m(x) - s w(x) N),     N = (b-d)/s
//! ```
//!
//! Replacing `m*Q` by the radial quadrature matrix `A` of `solver::grid`,
//! with `Q` continued past `R` by its last value, gives the dense system
//!
//! ```text
//! (diag(b + s w) - b A') Q = N (b m - s w N),     A' = A + (1 - A·1) e_{n-1}ᵀ
//! ```
//!
//! which is solved once by LU decomposition. The rows of `A'` sum to one,
//! so the far-field level of `C` is part of the solution rather than forced
//! by the truncation, and the profile does not move when `R` grows. With
//! `m = w` the solution is the constant `C = bN/s`.
//!
//! # Characteristics
//!
//! - **Dimensions**: 1 and 3
//! - **Cost**: `O(n²)` assembly, `O(n³)` factorization, no iteration
//! - **Closure**: always `(1, 0, 0)`

use crate::error::ModelError;
use crate::model::{Closure, EquilibriumEquation, Problem};
use crate::solver::grid::RadialGrid;
use crate::solver::iteration::ConvolutionScheme;
use crate::solver::{EquilibriumResult, Solver, validate_moment};
use nalgebra::{DMatrix, DVector};

const NAME: &str = "Nystrom";

/// Direct quadrature solve of the linearized pair equation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NystromSolver;

impl NystromSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for NystromSolver {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        let grid = RadialGrid::new(problem, NAME)?;
        let closure = Closure::asymmetric();
        let n = EquilibriumEquation::from_problem(problem).with_closure(closure).mean_field();
        let b = problem.birth_rate();
        let s = problem.death_rate();

        let birth = grid.birth();
        let death = grid.death();
        let quadrature = grid.continued_birth_matrix();

        let system = DMatrix::from_diagonal(&death.map(|w| b + s * w)) - quadrature * b;
        let rhs = DVector::from_fn(grid.nodes(), |i, _| n * (b * birth[i] - s * death[i] * n));

        let q = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| ModelError::Numerical("Nystrom system is singular".to_string()))?;
        validate_moment(&q, n, 1)?;

        log::info!("{NAME}: solved {0}x{0} system", grid.nodes());

        let mut result = EquilibriumResult::new(q.add_scalar(n * n), n, grid.step(), 0.0);
        super::describe(&mut result, NAME, problem, &closure);
        Ok(result)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
