//! Linear Neuman solver
//!
//! Fixed-point iteration under the asymmetric closure `(α, β, γ) = (1, 0, 0)`.
//! The first moment stays at the mean-field density `(b-d)/s` and the map
//!
//! ```text
//! Q ← (b m N - s w N² + b (m*Q)) / (b + s w)
//! ```
//!
//! is affine. `m*Q` continues `Q` past the last node by its boundary value,
//! and every sweep is followed by the constant-mode correction of
//! `iteration::iterate_linear`. Converges to the same vector as
//! [`NystromSolver`](super::NystromSolver).

use crate::error::ModelError;
use crate::model::{Closure, EquilibriumEquation, Problem};
use crate::solver::grid::RadialGrid;
use crate::solver::iteration;
use crate::solver::{EquilibriumResult, Solver};

const NAME: &str = "Linear Neuman";

/// Fixed point of the linearized pair equation (1D and 3D).
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearNeumanSolver;

impl LinearNeumanSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for LinearNeumanSolver {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        let grid = RadialGrid::new(problem, NAME)?;
        let equation = EquilibriumEquation::from_problem(problem).with_closure(Closure::asymmetric());

        let iterate = iteration::iterate_linear(
            &grid,
            &equation,
            problem.tolerance(),
            problem.iterations(),
            NAME,
        )?;

        Ok(super::assemble(&grid, iterate, NAME, problem, equation.closure()))
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Method, Radius};
    use approx::assert_relative_eq;

    #[test]
    fn test_ignores_stored_closure() {
        let base = Problem::builder()
            .rates(1.0, 0.5, 0.1)
            .radius(Radius::Fixed(8.0))
            .nodes(30)
            .iterations(50);
        let a = LinearNeumanSolver::new().solve(&base.clone().alpha(0.2).beta(0.7).gamma(0.1).build().unwrap()).unwrap();
        let b = LinearNeumanSolver::new().solve(&base.method(Method::LinearNeuman).build().unwrap()).unwrap();
        assert_eq!(a.c, b.c);
        assert_eq!(a.metadata.get("closure").map(String::as_str), Some("1 0 0"));
    }

    #[test]
    fn test_first_moment_is_mean_field() {
        let problem = Problem::builder()
            .rates(2.0, 0.4, 0.4)
            .radius(Radius::Fixed(6.0))
            .nodes(24)
            .iterations(20)
            .build()
            .unwrap();
        let result = LinearNeumanSolver::new().solve(&problem).unwrap();
        assert_relative_eq!(result.n, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_unsupported_dimension() {
        let problem = Problem::builder()
            .dimension(4)
            .radius(Radius::Fixed(8.0))
            .nodes(16)
            .build()
            .unwrap();
        assert!(LinearNeumanSolver::new().solve(&problem).is_err());
    }
}
