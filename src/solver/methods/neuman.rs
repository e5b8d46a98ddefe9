//! Nonlinear Neuman solver with direct quadrature
//!
//! # Mathematical Background
//!
//! Fixed-point (Neumann series) iteration `Q ← F(Q)` of the full nonlinear
//! pair equation. Convolutions are evaluated by the direct `O(n²)` radial
//! quadrature of `solver::grid`, which makes this solver the reference the
//! FFT-based [`TransformSolver`](super::TransformSolver) is checked against.
//!
//! # Characteristics
//!
//! - **Dimensions**: 1 and 3
//! - **Cost**: `O(n²)` per iteration
//! - **Closure**: the problem's `(α, β, γ)`

use crate::error::ModelError;
use crate::model::{EquilibriumEquation, Problem};
use crate::solver::grid::RadialGrid;
use crate::solver::iteration;
use crate::solver::{EquilibriumResult, Solver};

const NAME: &str = "Nonlinear Neuman";

/// Nonlinear fixed point on the direct radial grid.
///
/// # Example
///
/// ```rust
/// use moment_rs::model::{Problem, Radius};
/// use moment_rs::solver::{NeumanSolver, Solver};
///
/// let problem = Problem::builder().radius(Radius::Fixed(8.0)).nodes(32).build()?;
/// let result = NeumanSolver::new().solve(&problem)?;
/// assert_eq!(result.len(), 32);
/// # Ok::<(), moment_rs::ModelError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NeumanSolver;

impl NeumanSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for NeumanSolver {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        let grid = RadialGrid::new(problem, NAME)?;
        let equation = EquilibriumEquation::from_problem(problem);

        let iterate = iteration::iterate(
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
    use crate::model::Radius;

    #[test]
    fn test_neuman_solver_creation() {
        assert_eq!(NeumanSolver::new().name(), "Nonlinear Neuman");
        assert_eq!(NeumanSolver::default().name(), "Nonlinear Neuman");
    }

    #[test]
    fn test_rejects_two_dimensions() {
        let problem = Problem::builder()
            .dimension(2)
            .radius(Radius::Fixed(8.0))
            .nodes(16)
            .build()
            .unwrap();
        let err = NeumanSolver::new().solve(&problem).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedDimension { dimension: 2, .. }));
    }

    #[test]
    fn test_result_shape_and_metadata() {
        let problem = Problem::builder()
            .radius(Radius::Fixed(8.0))
            .nodes(40)
            .accuracy(8)
            .build()
            .unwrap();
        let result = NeumanSolver::new().solve(&problem).unwrap();
        assert_eq!(result.len(), 40);
        assert_eq!(result.origin, 0.0);
        assert!(result.c.iter().all(|c| c.is_finite() && *c >= 0.0));
        assert_eq!(result.metadata.get("solver").map(String::as_str), Some(NAME));
        assert!(result.converged(problem.tolerance()));
    }
}
