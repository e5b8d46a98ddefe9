//! Naive discrete Hankel solver
//!
//! The nonlinear fixed point for any dimension. Convolutions go through a
//! dense `O(n²)` discrete Hankel transform on a midpoint grid, so the first
//! node sits at `h/2` and `C(0)` is extrapolated by
//! [`EquilibriumResult::c0`].

use crate::error::ModelError;
use crate::model::{EquilibriumEquation, Problem};
use crate::solver::hankel::HankelScheme;
use crate::solver::iteration;
use crate::solver::{EquilibriumResult, Solver};

const NAME: &str = "Naive Hankel";

/// Nonlinear fixed point with a dense Hankel transform (any dimension).
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveHankelSolver;

impl NaiveHankelSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for NaiveHankelSolver {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        let scheme = HankelScheme::new(problem);
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
