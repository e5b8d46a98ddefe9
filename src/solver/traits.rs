//! Solver contract and result type
//!
//! # Design
//!
//! Every strategy is a stateless unit struct implementing [`Solver`]:
//! one [`Problem`] in, one [`EquilibriumResult`] out. The strategies differ
//! only in how they discretize and invert the same pair equation.
//!
//! # Stability
//!
//! - `Solver` trait: the only entry point of every strategy
//! - `EquilibriumResult`: fields are never removed; extra diagnostics go to
//!   `metadata`

use super::methods::{
    LinearNeumanSolver, NaiveHankelSolver, NeumanSolver, NystromSolver, TransformSolver,
};
use crate::error::ModelError;
use crate::model::{Method, Problem};
use nalgebra::DVector;
use std::collections::HashMap;
use std::fmt;

// =================================================================================================
// Solver trait
// =================================================================================================

/// Uniform contract of the equilibrium solvers.
pub trait Solver {
    /// Compute the equilibrium moments of `problem`.
    ///
    /// Non-convergence within the iteration ceiling is not an error; the
    /// returned result carries the final relative change so that callers
    /// can judge it.
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError>;

    /// Human-readable solver name.
    fn name(&self) -> &str;
}

// =================================================================================================
// Dispatch
// =================================================================================================

/// The concrete strategies, one variant per solver.
///
/// # Example
///
/// ```rust
/// use moment_rs::model::Method;
/// use moment_rs::solver::SolverKind;
///
/// assert!(matches!(SolverKind::select(1, None), SolverKind::Transform(_)));
/// assert!(matches!(SolverKind::select(3, Some(Method::Nystrom)), SolverKind::Nystrom(_)));
/// assert!(matches!(SolverKind::select(2, Some(Method::Neuman)), SolverKind::NaiveHankel(_)));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum SolverKind {
    NonlinearNeuman(NeumanSolver),
    LinearNeuman(LinearNeumanSolver),
    Nystrom(NystromSolver),
    Transform(TransformSolver),
    NaiveHankel(NaiveHankelSolver),
}

impl SolverKind {
    /// Pick the strategy for a dimension and an optional requested method.
    ///
    /// Dimensions 1 and 3 honour the method (FFT transform by default).
    /// Every other dimension falls back to the naive Hankel solver.
    pub fn select(dimension: usize, method: Option<Method>) -> Self {
        match (dimension, method) {
            (1 | 3, Some(Method::LinearNeuman)) => Self::LinearNeuman(LinearNeumanSolver::new()),
            (1 | 3, Some(Method::Nystrom)) => Self::Nystrom(NystromSolver::new()),
            (1 | 3, Some(Method::DirectNeuman)) => Self::NonlinearNeuman(NeumanSolver::new()),
            (1 | 3, Some(Method::Neuman) | None) => Self::Transform(TransformSolver::new()),
            (_, Some(method)) if method.is_linear() => {
                log::warn!(
                    "method '{method}' is not available in {dimension}D; using the naive Hankel \
                     solver with the stored closure instead of (1, 0, 0)"
                );
                Self::NaiveHankel(NaiveHankelSolver::new())
            }
            (_, method) => {
                if let Some(method) = method
                    && method != Method::Neuman
                {
                    log::warn!(
                        "method '{method}' is not available in {dimension}D; using the naive Hankel solver"
                    );
                }
                Self::NaiveHankel(NaiveHankelSolver::new())
            }
        }
    }

    /// Strategy for a validated problem.
    pub fn for_problem(problem: &Problem) -> Self {
        Self::select(problem.dimension(), problem.method())
    }

    fn inner(&self) -> &dyn Solver {
        match self {
            Self::NonlinearNeuman(solver) => solver,
            Self::LinearNeuman(solver) => solver,
            Self::Nystrom(solver) => solver,
            Self::Transform(solver) => solver,
            Self::NaiveHankel(solver) => solver,
        }
    }
}

impl Solver for SolverKind {
    fn solve(&self, problem: &Problem) -> Result<EquilibriumResult, ModelError> {
        log::info!("solving with {}", self.name());
        self.inner().solve(problem)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =================================================================================================
// Result
// =================================================================================================

/// Equilibrium second and first moments on a radial grid.
///
/// # Example
///
/// ```rust
/// use moment_rs::solver::EquilibriumResult;
/// use nalgebra::DVector;
///
/// let result = EquilibriumResult::new(DVector::from_vec(vec![1.5, 1.2, 1.1]), 1.0, 0.5, 0.0);
/// assert_eq!(result.c0(), 1.5);
/// assert_eq!(result.position(2), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct EquilibriumResult {
    /// Second moment `C` at the grid nodes, from the origin outward.
    pub c: DVector<f64>,

    /// First moment `N` (equilibrium density).
    pub n: f64,

    /// Grid spacing.
    pub step: f64,

    /// Position of the first node.
    pub origin: f64,

    /// Iterations performed (1 for direct solvers).
    pub iterations: usize,

    /// Relative change of the last iteration (0 for direct solvers).
    pub change: f64,

    /// Free-form diagnostics (solver name, dimension, ...).
    pub metadata: HashMap<String, String>,
}

impl EquilibriumResult {
    pub fn new(c: DVector<f64>, n: f64, step: f64, origin: f64) -> Self {
        Self {
            c,
            n,
            step,
            origin,
            iterations: 1,
            change: 0.0,
            metadata: HashMap::new(),
        }
    }

    /// Record the convergence history.
    pub fn with_convergence(mut self, iterations: usize, change: f64) -> Self {
        self.iterations = iterations;
        self.change = change;
        self
    }

    /// Add metadata
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Number of grid nodes.
    pub fn len(&self) -> usize {
        self.c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }

    /// Position of node `i`.
    pub fn position(&self, i: usize) -> f64 {
        self.origin + i as f64 * self.step
    }

    /// Second moment at zero distance.
    ///
    /// `c[0]` when the grid starts at the origin; otherwise the quadratic
    /// through the first three nodes is extrapolated to zero.
    pub fn c0(&self) -> f64 {
        if self.origin == 0.0 || self.c.len() < 3 {
            return self.c[0];
        }
        // Lagrange weights at x = 0 with t = -origin/step in node units
        let t = -self.origin / self.step;
        let l0 = (t - 1.0) * (t - 2.0) / 2.0;
        let l1 = -t * (t - 2.0);
        let l2 = t * (t - 1.0) / 2.0;
        l0 * self.c[0] + l1 * self.c[1] + l2 * self.c[2]
    }

    /// True if the last iteration changed `C` by less than `tolerance`.
    pub fn converged(&self, tolerance: f64) -> bool {
        self.change < tolerance
    }
}
