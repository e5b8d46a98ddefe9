//! Equilibrium equations of the Dieckmann–Law model
//!
//! ```text
//! 0 = (b - d) N - s ∫ w(y) C(y) dy
//! 0 = b m(x) N + b (m*C)(x) - d C(x) - s w(x) C(x) - s ∫ w(y) T(x,y) dy
//! ```
//!
//! # Design
//!
//! The solvers work with the pair-correlation excess `Q = C - N²`, which
//! decays to zero at large distances, instead of `C` itself. With
//! `Y = ∫ w Q` the density balance reads `N² - M N + Y = 0`, `M = (b-d)/s`,
//! and substituting the closure turns the pair equation into the pointwise
//! fixed-point form
//!
//! ```text
//! Q·[d + s w + α(b-d)/(α+β) + sβN/(α+β)]
//!    = b m N - s w N² + b (m*Q) + s N P (β-γ)/(α+β)
//!      - s/(α+β)·[ (β+γ) N (w*Q) + β Q (w*Q)/N + γ ((wQ)*Q)/N ]
//! ```
//!
//! with `P = M N`. Every solver evaluates the convolutions with its own
//! discretization and then calls [`EquilibriumEquation::update`] point by
//! point.

use super::closure::Closure;
use super::problem::Problem;

/// Local quantities entering the pair equation at one grid point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointTerms {
    /// Birth kernel `m(x)`.
    pub birth: f64,
    /// Death kernel `w(x)`.
    pub death: f64,
    /// Current `Q(x)`.
    pub q: f64,
    /// `(m*Q)(x)`.
    pub birth_conv: f64,
    /// `(w*Q)(x)`, zero under a linear closure.
    pub death_conv: f64,
    /// `((wQ)*Q)(x)`, zero under a linear closure.
    pub triple_conv: f64,
}

/// Rates and closure of one equilibrium problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumEquation {
    birth_rate: f64,
    death_rate: f64,
    environmental_death_rate: f64,
    closure: Closure,
}

impl EquilibriumEquation {
    pub fn new(birth_rate: f64, death_rate: f64, environmental_death_rate: f64, closure: Closure) -> Self {
        Self {
            birth_rate,
            death_rate,
            environmental_death_rate,
            closure,
        }
    }

    /// Equation of `problem` with its stored closure weights.
    pub fn from_problem(problem: &Problem) -> Self {
        Self::new(
            problem.birth_rate(),
            problem.death_rate(),
            problem.environmental_death_rate(),
            *problem.closure(),
        )
    }

    /// Replace the closure weights.
    pub fn with_closure(mut self, closure: Closure) -> Self {
        self.closure = closure;
        self
    }

    pub fn closure(&self) -> &Closure {
        &self.closure
    }

    /// Birth rate `b`.
    pub fn birth_rate(&self) -> f64 {
        self.birth_rate
    }

    /// Competitive death rate `s`.
    pub fn death_rate(&self) -> f64 {
        self.death_rate
    }

    /// Mean-field density `(b - d)/s`, the equilibrium without spatial correlation.
    pub fn mean_field(&self) -> f64 {
        (self.birth_rate - self.environmental_death_rate) / self.death_rate
    }

    /// First moment for a given `Y = ∫ w Q`.
    ///
    /// Larger root of `N² - M N + Y = 0`, clamped to `M/2` when the
    /// discriminant is negative. Under a linear closure `N` stays at the
    /// mean field.
    pub fn first_moment(&self, y: f64) -> f64 {
        let mean_field = self.mean_field();
        if self.closure.is_linear() {
            return mean_field;
        }
        let discriminant = mean_field * mean_field - 4.0 * y;
        if discriminant < 0.0 {
            log::debug!("negative discriminant {discriminant:.3e}, clamping first moment");
            return 0.5 * mean_field;
        }
        0.5 * (mean_field + discriminant.sqrt())
    }

    /// One application of the fixed-point map at a single point.
    pub fn update(&self, n: f64, terms: &PointTerms) -> f64 {
        let b = self.birth_rate;
        let s = self.death_rate;
        let d = self.environmental_death_rate;
        let Closure { alpha, beta, gamma } = self.closure;
        let weight = self.closure.weight();

        let diagonal = d + s * terms.death + alpha * (b - d) / weight + s * beta * n / weight;

        let mut rhs = b * terms.birth * n - s * terms.death * n * n + b * terms.birth_conv;
        if !self.closure.is_linear() {
            let p = self.mean_field() * n;
            rhs += s * n * p * (beta - gamma) / weight;
            rhs -= s / weight
                * ((beta + gamma) * n * terms.death_conv
                    + beta * terms.q * terms.death_conv / n
                    + gamma * terms.triple_conv / n);
        }

        rhs / diagonal
    }
}
