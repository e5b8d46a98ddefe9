//! Second-order closure of the third spatial moment
//!
//! ```text
//!              1      C(x)C(y)     C(x)C(y-x)     C(y)C(y-x)
//!   T(x,y) = ---  ( A -------- + B ---------- + G ---------- - B N^3 )
//!            A+B         N             N              N
//! ```

use crate::error::ModelError;

/// Closure weights `(α, β, γ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closure {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Closure {
    /// Create a closure after checking the weights.
    ///
    /// Weights must be finite and non-negative with `α + β > 0`.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self, ModelError> {
        let closure = Self { alpha, beta, gamma };
        closure.validate()?;
        Ok(closure)
    }

    /// The asymmetric closure `(1, 0, 0)` that makes the pair equation linear.
    pub fn asymmetric() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            gamma: 0.0,
        }
    }

    /// True when `β = γ = 0`.
    pub fn is_linear(&self) -> bool {
        self.beta == 0.0 && self.gamma == 0.0
    }

    /// `α + β`, the normalization of the closure.
    pub fn weight(&self) -> f64 {
        self.alpha + self.beta
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (parameter, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::parameter(parameter, format!("{value} is not a non-negative weight")));
            }
        }
        if self.weight() <= 0.0 {
            return Err(ModelError::parameter("alpha", "alpha + beta must be positive"));
        }
        Ok(())
    }

    /// Third moment `T(x, y)` from `C(x)`, `C(y)`, `C(y - x)` and `N`.
    pub fn third_moment(&self, cx: f64, cy: f64, cyx: f64, n: f64) -> f64 {
        (self.alpha * cx * cy / n + self.beta * cx * cyx / n + self.gamma * cy * cyx / n
            - self.beta * n * n * n)
            / self.weight()
    }
}

impl Default for Closure {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            beta: 0.3,
            gamma: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_asymmetric_closure_is_linear() {
        assert!(Closure::asymmetric().is_linear());
        assert!(!Closure::default().is_linear());
    }

    #[test]
    fn test_third_moment_uncorrelated_limit() {
        // C ≡ N² gives T = N³ for any weights
        let n = 1.7;
        let c = n * n;
        for closure in [Closure::asymmetric(), Closure::default(), Closure::new(0.2, 0.8, 0.1).unwrap()] {
            assert_relative_eq!(closure.third_moment(c, c, c, n), n * n * n, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_third_moment_asymmetric() {
        let closure = Closure::asymmetric();
        assert_relative_eq!(closure.third_moment(2.0, 3.0, 100.0, 4.0), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_weights() {
        assert!(Closure::new(0.0, 0.0, 1.0).is_err());
        assert!(Closure::new(-1.0, 0.5, 0.0).is_err());
        assert!(Closure::new(1.0, f64::NAN, 0.0).is_err());
        assert!(Closure::new(0.0, 1.0, 0.0).is_ok());
    }
}
