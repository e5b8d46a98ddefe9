//! Transform-domain (FFT) solver
//!
//! Same nonlinear fixed point as [`NeumanSolver`](super::NeumanSolver) and the
//! same quadrature sums, but each convolution is a zero-padded linear
//! convolution evaluated with real FFTs. Kernel spectra are computed once per
//! solve; every iteration transforms `Q`, `wQ` and the profile of `Q`.
//!
//! # Characteristics
//!
//! - **Dimensions**: 1 and 3
//! - **Cost**: `O(n log n)` per iteration
//! - **Default**: chosen by the dispatcher when no method is requested

use crate::error::ModelError;
use crate::model::{EquilibriumEquation, Problem};
use crate::solver::iteration;
use crate::solver::spectral::SpectralScheme;
use crate::solver::{EquilibriumResult, Solver};

const NAME: &str = "Transform";

/// Nonlinear fixed point with FFT convolutions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformSolver;

impl TransformSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for TransformSolver {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        let scheme = SpectralScheme::new(problem, NAME)?;
        let equation = EquilibriumEquation::from_problem(problem);

        let iterate = iteration::iterate(
            &scheme,
            &equation,
            problem.tolerance(),
            problem.iterations(),
            NAME,
        )?;

        Ok(super::assemble(&scheme, iterate, NAME, problem, equation.closure()))
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
    fn test_transform_solver_creation() {
        assert_eq!(TransformSolver::new().name(), "Transform");
    }

    #[test]
    fn test_rejects_two_dimensions() {
        let problem = Problem::builder()
            .dimension(2)
            .radius(Radius::Fixed(8.0))
            .nodes(16)
            .build()
            .unwrap();
        assert!(matches!(
            TransformSolver::new().solve(&problem),
            Err(ModelError::UnsupportedDimension { solver: "Transform", .. })
        ));
    }

    #[test]
    fn test_three_dimensional_solve() {
        let problem = Problem::builder()
            .dimension(3)
            .radius(Radius::Fixed(8.0))
            .nodes(48)
            .build()
            .unwrap();
        let result = TransformSolver::new().solve(&problem).unwrap();
        assert_eq!(result.len(), 48);
        assert!(result.n > 0.0);
        assert!(result.c.iter().all(|c| c.is_finite()));
    }
}
