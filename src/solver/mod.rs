//! Numerical solvers
//!
//! This module turns a validated [`Problem`](crate::model::Problem) into an
//! [`EquilibriumResult`].
//!
//! # Module Organization
//!
//! - **`traits`**: the [`Solver`] trait, [`SolverKind`] dispatch and the result type
//! - **`iteration`**: the fixed-point engine shared by the Neuman-type solvers
//! - **`grid`**: direct radial quadrature on `x_i = i h` (1D and 3D)
//! - **`spectral`**: the same quadrature sums evaluated with FFTs
//! - **`hankel`**: dense discrete Hankel transform on a midpoint grid (any D)
//! - **`methods`**: the concrete solvers
//!
//! # Quick Start Example
//!
//! ```rust
//! use moment_rs::model::{Method, Problem, Radius};
//! use moment_rs::solver::{Solver, SolverKind};
//!
//! let problem = Problem::builder()
//!     .rates(1.0, 0.1, 0.1)
//!     .radius(Radius::Fixed(10.0))
//!     .nodes(64)
//!     .method(Method::Nystrom)
//!     .build()?;
//!
//! let solver = SolverKind::for_problem(&problem);
//! let result = solver.solve(&problem)?;
//!
//! println!("N = {}, C(0) = {}", result.n, result.c0());
//! # Ok::<(), moment_rs::ModelError>(())
//! ```
//!
//! # Error Handling
//!
//! Solvers return [`ModelError`](crate::ModelError). A diverging iterate
//! aborts with `ModelError::Numerical`, whether it turned infinite or only
//! grew past `10^6` times the squared mean-field density. Reaching the
//! iteration ceiling without diverging does not fail; it is logged and
//! reported through `EquilibriumResult::change`.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod traits;
mod iteration;
mod grid;
mod spectral;
mod hankel;
mod methods;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Node count from which the direct quadrature sums run on Rayon.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Node count from which `RadialGrid` evaluates its sums in parallel.
///
/// Only consulted when the crate is built with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use moment_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the node count at which the direct sums go parallel.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use moment_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Sets a threshold for the duration of a test.
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(threshold: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(threshold);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{EquilibriumResult, Solver, SolverKind};

pub use methods::{
    LinearNeumanSolver, NaiveHankelSolver, NeumanSolver, NystromSolver, TransformSolver,
};

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::ModelError;
use nalgebra::DVector;

/// Peak `|C|` over the mean-field level `M²` past which an iterate has diverged.
const DIVERGENCE_FACTOR: f64 = 1e6;

/// Check an iterate for NaN or Inf values.
///
/// `q` is the pair-correlation excess `C - N²` and `n` the first moment
/// computed in the same `iteration`.
pub(crate) fn validate_moment(q: &DVector<f64>, n: f64, iteration: usize) -> Result<(), ModelError> {
    if !n.is_finite() {
        return Err(ModelError::Numerical(format!(
            "first moment became {n} at iteration {iteration}"
        )));
    }

    if let Some(node) = q.iter().position(|x| x.is_nan()) {
        return Err(ModelError::Numerical(format!(
            "NaN detected at node {node} in iteration {iteration}. \
             Try a smaller radius step or a contractive closure."
        )));
    }

    if let Some(node) = q.iter().position(|x| x.is_infinite()) {
        return Err(ModelError::Numerical(format!(
            "iteration diverged: infinity at node {node} in iteration {iteration}. \
             Check the rates and closure weights."
        )));
    }

    Ok(())
}

/// Reject a finite iterate that has run away from the mean-field level.
///
/// `mean_field` is `M = (b-d)/s`; the iterate has diverged once some
/// `|C_i|` exceeds `10^6 M²`. Reported exactly like an infinite iterate.
pub(crate) fn check_divergence(c: &DVector<f64>, mean_field: f64, iteration: usize) -> Result<(), ModelError> {
    let bound = DIVERGENCE_FACTOR * mean_field * mean_field;
    if let Some(node) = c.iter().position(|x| x.abs() > bound) {
        return Err(ModelError::Numerical(format!(
            "iteration diverged: |C| = {:.3e} at node {node} in iteration {iteration} \
             exceeds {bound:.3e}. Check the rates and closure weights.",
            c[node].abs()
        )));
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
