//! Kernel shape parameter records

use crate::error::ModelError;

/// Shape of the birth (`m`) and death (`w`) dispersal kernels.
///
/// Each variant carries the scale/shape parameters of both kernels. The
/// parameters are validated by [`KernelShape::validate`], which
/// [`KernelSet::new`](super::KernelSet::new) always calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelShape {
    /// Gaussian kernels with standard deviations `sigma_m` and `sigma_w`.
    Normal { sigma_m: f64, sigma_w: f64 },

    /// Equal-weight mixture of two Gaussians with scales `s0` and `s1`,
    /// shared by the birth and the death kernel.
    Kurtic { s0: f64, s1: f64 },

    /// Kurtic mixtures with independent scales for birth and death.
    GeneralKurtic { s0m: f64, s1m: f64, s0w: f64, s1w: f64 },

    /// Danchenko exponential kernels, `a` the birth scale and `b` the death scale.
    Exponential { a: f64, b: f64 },

    /// Exponential-power law `exp(-(r/s)^γ)`.
    Roughgarden { sm: f64, gamma_m: f64, sw: f64, gamma_w: f64 },

    /// Polynomial-weighted exponential `r^a exp(-b r)`.
    ExponentialPolynomial { am: f64, bm: f64, aw: f64, bw: f64 },

    /// Top-hat kernels, uniform inside the given radius.
    Constant { birth_radius: f64, death_radius: f64 },
}

impl KernelShape {
    /// Short lowercase name used in diagnostics and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            KernelShape::Normal { .. } => "normal",
            KernelShape::Kurtic { .. } => "kurtic",
            KernelShape::GeneralKurtic { .. } => "general kurtic",
            KernelShape::Exponential { .. } => "exponential",
            KernelShape::Roughgarden { .. } => "roughgarden",
            KernelShape::ExponentialPolynomial { .. } => "exponential polynomial",
            KernelShape::Constant { .. } => "constant",
        }
    }

    /// Check that every parameter is admissible for its formula.
    ///
    /// Scales, radii, rates and exponents must be finite and strictly
    /// positive; the polynomial power of the exponential-polynomial law only
    /// has to be non-negative.
    pub fn validate(&self) -> Result<(), ModelError> {
        let shape = self.name();
        match *self {
            KernelShape::Normal { sigma_m, sigma_w } => {
                positive(shape, "sigma_m", sigma_m)?;
                positive(shape, "sigma_w", sigma_w)
            }
            KernelShape::Kurtic { s0, s1 } => {
                positive(shape, "s0", s0)?;
                positive(shape, "s1", s1)
            }
            KernelShape::GeneralKurtic { s0m, s1m, s0w, s1w } => {
                positive(shape, "s0m", s0m)?;
                positive(shape, "s1m", s1m)?;
                positive(shape, "s0w", s0w)?;
                positive(shape, "s1w", s1w)
            }
            KernelShape::Exponential { a, b } => {
                positive(shape, "a", a)?;
                positive(shape, "b", b)
            }
            KernelShape::Roughgarden { sm, gamma_m, sw, gamma_w } => {
                positive(shape, "sm", sm)?;
                positive(shape, "gamma_m", gamma_m)?;
                positive(shape, "sw", sw)?;
                positive(shape, "gamma_w", gamma_w)
            }
            KernelShape::ExponentialPolynomial { am, bm, aw, bw } => {
                non_negative(shape, "am", am)?;
                positive(shape, "bm", bm)?;
                non_negative(shape, "aw", aw)?;
                positive(shape, "bw", bw)
            }
            KernelShape::Constant { birth_radius, death_radius } => {
                positive(shape, "birth_radius", birth_radius)?;
                positive(shape, "death_radius", death_radius)
            }
        }
    }
}

impl Default for KernelShape {
    fn default() -> Self {
        KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 }
    }
}

fn positive(shape: &'static str, parameter: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidKernel {
            shape,
            parameter,
            value,
            reason: "must be finite and positive",
        })
    }
}

fn non_negative(shape: &'static str, parameter: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidKernel {
            shape,
            parameter,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_shapes_pass() {
        let shapes = [
            KernelShape::default(),
            KernelShape::Kurtic { s0: 0.5, s1: 2.0 },
            KernelShape::ExponentialPolynomial { am: 0.0, bm: 1.0, aw: 2.0, bw: 3.0 },
            KernelShape::Constant { birth_radius: 1.0, death_radius: 2.0 },
        ];
        for shape in shapes {
            assert!(shape.validate().is_ok(), "{} should be valid", shape.name());
        }
    }

    #[test]
    fn test_zero_radius_rejected() {
        let shape = KernelShape::Constant { birth_radius: 0.0, death_radius: 1.0 };
        match shape.validate() {
            Err(ModelError::InvalidKernel { parameter, .. }) => assert_eq!(parameter, "birth_radius"),
            other => panic!("expected InvalidKernel, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_and_negative_parameters_rejected() {
        assert!(KernelShape::Normal { sigma_m: f64::NAN, sigma_w: 1.0 }.validate().is_err());
        assert!(KernelShape::Exponential { a: 1.0, b: -2.0 }.validate().is_err());
        assert!(
            KernelShape::ExponentialPolynomial { am: -0.5, bm: 1.0, aw: 0.0, bw: 1.0 }
                .validate()
                .is_err()
        );
        assert!(
            KernelShape::Roughgarden { sm: 1.0, gamma_m: 0.0, sw: 1.0, gamma_w: 2.0 }
                .validate()
                .is_err()
        );
    }
}
