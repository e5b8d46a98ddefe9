//! Fixed-point engine shared by the iterative solvers
//!
//! # Algorithm
//!
//! Jacobi iteration on `Q = C - N²`, seeded with the uncorrelated state
//! `Q = 0`, `N = (b-d)/s`:
//!
//! 1. `Y ← ∫ w Q`, `N ← first_moment(Y)`
//! 2. convolutions `m*Q`, `w*Q`, `(wQ)*Q` of the whole current iterate
//! 3. `Q_i ← F_i(Q)` for every node, written to a fresh vector
//! 4. stop when `max_i |C_new - C_old| / |C_new| < 10^{-accuracy}`
//!
//! Reaching the iteration ceiling is not an error: the last iterate is
//! returned and a warning is logged. A diverging iterate is: both an
//! infinite value and a peak above `10^6 M²` abort with
//! `ModelError::Numerical`.
//!
//! # Linear closure
//!
//! Under `β = γ = 0` the first moment is pinned to `M` and the far-field
//! level of `Q` is left free: `m*Q` is evaluated with `Q` continued past the
//! last node by its boundary value, so the truncated operator keeps unit row
//! sums and the profile does not depend on `R`. [`iterate_linear`] adds a
//! constant-mode correction to the plain sweep, which damps that level only
//! at the rate `s w/(b + s w)` on its own.
//!
//! The discretization is abstracted behind [`ConvolutionScheme`], implemented
//! by the direct grid, the FFT scheme and the naive Hankel scheme.

use super::{check_divergence, validate_moment};
use crate::error::ModelError;
use crate::model::{EquilibriumEquation, PointTerms};
use nalgebra::DVector;

/// Convolutions of the current `Q` at every node.
#[derive(Debug, Clone)]
pub(crate) struct Convolutions {
    /// `m*Q`
    pub birth: DVector<f64>,
    /// `w*Q`
    pub death: DVector<f64>,
    /// `(wQ)*Q`
    pub triple: DVector<f64>,
}

impl Convolutions {
    /// Only `m*Q`, for a linear closure.
    pub(crate) fn linear(birth: DVector<f64>) -> Self {
        let nodes = birth.len();
        Self {
            birth,
            death: DVector::zeros(nodes),
            triple: DVector::zeros(nodes),
        }
    }
}

/// A discretization of the radial convolution operator.
pub(crate) trait ConvolutionScheme {
    fn nodes(&self) -> usize;

    /// Grid spacing.
    fn step(&self) -> f64;

    /// Position of the first node.
    fn origin(&self) -> f64;

    /// Birth kernel at the nodes.
    fn birth(&self) -> &DVector<f64>;

    /// Death kernel at the nodes.
    fn death(&self) -> &DVector<f64>;

    /// `∫_{R^D} f` for node values `f`.
    fn integrate(&self, f: &DVector<f64>) -> f64;

    /// Convolutions of `q`; the death and triple terms only when `nonlinear`.
    fn convolutions(&self, q: &DVector<f64>, nonlinear: bool) -> Result<Convolutions, ModelError>;

    /// `m*Q` with `Q` continued past the last node by its boundary value.
    fn continued_birth(&self, q: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
        let edge = q.as_slice().last().copied().unwrap_or(0.0);
        let inner = self.convolutions(&q.add_scalar(-edge), false)?.birth;
        Ok(inner.add_scalar(edge))
    }
}

/// Outcome of a fixed-point run.
#[derive(Debug, Clone)]
pub(crate) struct Iterate {
    pub c: DVector<f64>,
    pub n: f64,
    pub iterations: usize,
    pub change: f64,
}

/// `max_i |new_i - old_i| / |new_i|`, absolute where `new_i == 0`.
pub(crate) fn relative_change(old: &DVector<f64>, new: &DVector<f64>) -> f64 {
    old.iter()
        .zip(new.iter())
        .map(|(old, new)| {
            let diff = (new - old).abs();
            if *new == 0.0 { diff } else { diff / new.abs() }
        })
        .fold(0.0, f64::max)
}

/// Apply `F` once to `q` with first moment `n`.
pub(crate) fn apply<S: ConvolutionScheme>(
    scheme: &S,
    equation: &EquilibriumEquation,
    q: &DVector<f64>,
    n: f64,
) -> Result<DVector<f64>, ModelError> {
    let conv = if equation.closure().is_linear() {
        Convolutions::linear(scheme.continued_birth(q)?)
    } else {
        scheme.convolutions(q, true)?
    };
    let birth = scheme.birth();
    let death = scheme.death();

    Ok(DVector::from_fn(scheme.nodes(), |i, _| {
        let terms = PointTerms {
            birth: birth[i],
            death: death[i],
            q: q[i],
            birth_conv: conv.birth[i],
            death_conv: conv.death[i],
            triple_conv: conv.triple[i],
        };
        equation.update(n, &terms)
    }))
}

/// Run the fixed point to `tolerance` or `max_iterations`.
pub(crate) fn iterate<S: ConvolutionScheme>(
    scheme: &S,
    equation: &EquilibriumEquation,
    tolerance: f64,
    max_iterations: usize,
    solver: &str,
) -> Result<Iterate, ModelError> {
    let nodes = scheme.nodes();
    let death = scheme.death();
    let mean_field = equation.mean_field();

    let mut q = DVector::zeros(nodes);
    let mut n = mean_field;
    let mut c = DVector::from_element(nodes, n * n);
    let mut change = f64::INFINITY;

    for iteration in 1..=max_iterations {
        let y = scheme.integrate(&death.component_mul(&q));
        n = equation.first_moment(y);

        let next = apply(scheme, equation, &q, n)?;
        validate_moment(&next, n, iteration)?;

        let next_c = next.add_scalar(n * n);
        check_divergence(&next_c, mean_field, iteration)?;
        change = relative_change(&c, &next_c);
        q = next;
        c = next_c;

        log::debug!("{solver}: iteration {iteration}, N = {n:.10}, change = {change:.3e}");

        if change < tolerance {
            log::info!("{solver}: converged after {iteration} iterations (change {change:.3e})");
            return Ok(Iterate {
                c,
                n,
                iterations: iteration,
                change,
            });
        }
    }

    log::warn!(
        "{solver}: no convergence within {max_iterations} iterations, last change {change:.3e} \
         (tolerance {tolerance:.1e}); returning last iterate"
    );
    Ok(Iterate {
        c,
        n,
        iterations: max_iterations,
        change,
    })
}

/// Fixed point under the linear closure `(1, 0, 0)`.
///
/// Each sweep `Q' = F(Q)` is followed by the constant shift `t` that zeroes
/// the integrated residual of `(b + s w) Q - b m*Q = N (b m - s w N)`:
///
/// ```text
/// t = b ∫ (m*Q' - m*Q) / (s ∫ w)
/// ```
///
/// `m*` has unit row sums on the continued grid, so the shifted convolution
/// is `m*Q' + t` and one convolution per sweep suffices. The fixed point is
/// the same as the plain sweep's.
pub(crate) fn iterate_linear<S: ConvolutionScheme>(
    scheme: &S,
    equation: &EquilibriumEquation,
    tolerance: f64,
    max_iterations: usize,
    solver: &str,
) -> Result<Iterate, ModelError> {
    let nodes = scheme.nodes();
    let birth = scheme.birth();
    let death = scheme.death();
    let n = equation.mean_field();
    let b = equation.birth_rate();
    let competition = equation.death_rate() * scheme.integrate(death);

    let mut q = DVector::zeros(nodes);
    let mut convolved = DVector::zeros(nodes);
    let mut c = DVector::from_element(nodes, n * n);
    let mut change = f64::INFINITY;

    for iteration in 1..=max_iterations {
        let mut next = DVector::from_fn(nodes, |i, _| {
            let terms = PointTerms {
                birth: birth[i],
                death: death[i],
                q: q[i],
                birth_conv: convolved[i],
                ..PointTerms::default()
            };
            equation.update(n, &terms)
        });
        let mut next_convolved = scheme.continued_birth(&next)?;

        let shift = b * scheme.integrate(&(&next_convolved - &convolved)) / competition;
        next.add_scalar_mut(shift);
        next_convolved.add_scalar_mut(shift);
        validate_moment(&next, n, iteration)?;

        let next_c = next.add_scalar(n * n);
        check_divergence(&next_c, n, iteration)?;
        change = relative_change(&c, &next_c);
        q = next;
        convolved = next_convolved;
        c = next_c;

        log::debug!("{solver}: iteration {iteration}, shift = {shift:.3e}, change = {change:.3e}");

        if change < tolerance {
            log::info!("{solver}: converged after {iteration} iterations (change {change:.3e})");
            return Ok(Iterate {
                c,
                n,
                iterations: iteration,
                change,
            });
        }
    }

    log::warn!(
        "{solver}: no convergence within {max_iterations} iterations, last change {change:.3e} \
         (tolerance {tolerance:.1e}); returning last iterate"
    );
    Ok(Iterate {
        c,
        n,
        iterations: max_iterations,
        change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_change() {
        let old = DVector::from_vec(vec![1.0, 2.0, 0.0]);
        let new = DVector::from_vec(vec![1.1, 2.0, 0.0]);
        let change = relative_change(&old, &new);
        assert!((change - 0.1 / 1.1).abs() < 1e-15);

        let same = DVector::from_vec(vec![0.5, 0.0]);
        assert_eq!(relative_change(&same, &same.clone()), 0.0);
    }

    #[test]
    fn test_linear_convolutions_are_zero_padded() {
        let terms = Convolutions::linear(DVector::from_element(3, 2.0));
        assert_eq!(terms.death.len(), 3);
        assert_eq!(terms.triple.sum(), 0.0);
    }
}
