//! Dispersal kernels
//!
//! The birth kernel `m(r)` places offspring around their parent, the death
//! kernel `w(r)` weights competition between neighbours. Both are radially
//! symmetric probability densities on `R^D`:
//!
//! ```text
//! S_D ∫_0^∞ r^{D-1} k(r) dr = 1,   k(r) ≥ 0
//! ```
//!
//! # Design
//!
//! [`KernelShape`] is the user-facing parameter record (one variant per
//! shape). [`KernelSet`] binds a validated shape to a dimension and resolves
//! each kernel into a normalized radial profile once, so that evaluation in
//! the solvers' inner loops is a single closed-form expression.
//!
//! | Shape | law | transform |
//! |---|---|---|
//! | Normal | Gaussian | closed form |
//! | Kurtic / GeneralKurtic | mean of two Gaussians | closed form |
//! | Exponential | `exp(-r/a)` | closed form |
//! | Roughgarden | `exp(-(r/s)^γ)` | Simpson quadrature |
//! | ExponentialPolynomial | `r^a exp(-b r)` | Simpson quadrature |
//! | Constant | top-hat | `φ_{D+2}(kρ)` |

mod shape;

pub use shape::KernelShape;

use crate::error::ModelError;
use crate::radial::{ball_volume, gamma, ln_gamma, phi, simpson, sphere_area};
use std::f64::consts::PI;
use std::fmt;

/// Mass left outside the effective radius.
const EFFECTIVE_MASS_DEFECT: f64 = 1e-6;

/// Mass fractions bounding the radial band reported by [`KernelSet::spread`].
const SPREAD_QUANTILES: (f64, f64) = (0.25, 0.75);

/// Minimum number of Simpson panels for radial integrals.
const MIN_PANELS: usize = 2000;

/// Which of the two kernels to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Birth (offspring dispersal) kernel `m`.
    Birth,
    /// Death (competition) kernel `w`.
    Death,
}

// =================================================================================================
// Radial profiles
// =================================================================================================

/// Normalized radial law of one kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Profile {
    Gaussian { sigma: f64 },
    Mixture { s0: f64, s1: f64 },
    Exponential { scale: f64, norm: f64 },
    Power { scale: f64, shape: f64, norm: f64 },
    Polynomial { power: f64, rate: f64, norm: f64 },
    TopHat { radius: f64, density: f64 },
}

fn gaussian(sigma: f64, r: f64, dimension: usize) -> f64 {
    (2.0 * PI * sigma * sigma).powf(-(dimension as f64) / 2.0) * (-r * r / (2.0 * sigma * sigma)).exp()
}

impl Profile {
    fn resolve(dimension: usize, law: Law) -> Self {
        let dim = dimension as f64;
        let area = sphere_area(dimension);
        match law {
            Law::Gaussian(sigma) => Profile::Gaussian { sigma },
            Law::Mixture(s0, s1) => Profile::Mixture { s0, s1 },
            Law::Exponential(scale) => Profile::Exponential {
                scale,
                norm: 1.0 / (area * scale.powf(dim) * gamma(dim)),
            },
            Law::Power(scale, shape) => Profile::Power {
                scale,
                shape,
                norm: shape / (area * scale.powf(dim) * gamma(dim / shape)),
            },
            Law::Polynomial(power, rate) => Profile::Polynomial {
                power,
                rate,
                // rate^(D+a) overflows long before the ratio does
                norm: ((dim + power) * rate.ln() - area.ln() - ln_gamma(dim + power)).exp(),
            },
            Law::TopHat(radius) => Profile::TopHat {
                radius,
                density: 1.0 / ball_volume(dimension, radius),
            },
        }
    }

    fn evaluate(&self, r: f64, dimension: usize) -> f64 {
        let r = r.abs();
        match *self {
            Profile::Gaussian { sigma } => gaussian(sigma, r, dimension),
            Profile::Mixture { s0, s1 } => 0.5 * (gaussian(s0, r, dimension) + gaussian(s1, r, dimension)),
            Profile::Exponential { scale, norm } => norm * (-r / scale).exp(),
            Profile::Power { scale, shape, norm } => norm * (-(r / scale).powf(shape)).exp(),
            Profile::Polynomial { power, rate, norm } => norm * r.powf(power) * (-rate * r).exp(),
            Profile::TopHat { radius, density } => {
                if r <= radius {
                    density
                } else {
                    0.0
                }
            }
        }
    }

    /// Closed-form transform, `None` when it has to be integrated.
    fn closed_transform(&self, k: f64, dimension: usize) -> Option<f64> {
        let dim = dimension as f64;
        match *self {
            Profile::Gaussian { sigma } => Some((-sigma * sigma * k * k / 2.0).exp()),
            Profile::Mixture { s0, s1 } => {
                Some(0.5 * ((-s0 * s0 * k * k / 2.0).exp() + (-s1 * s1 * k * k / 2.0).exp()))
            }
            Profile::Exponential { scale, .. } => {
                Some((1.0 + scale * scale * k * k).powf(-(dim + 1.0) / 2.0))
            }
            Profile::TopHat { radius, .. } => Some(phi(dimension + 2, k * radius)),
            Profile::Power { .. } | Profile::Polynomial { .. } => None,
        }
    }

    /// Radius beyond which the profile carries no measurable mass.
    fn tail(&self, dimension: usize) -> f64 {
        let dim = dimension as f64;
        match *self {
            Profile::Gaussian { sigma } => 12.0 * sigma,
            Profile::Mixture { s0, s1 } => 12.0 * s0.max(s1),
            Profile::Exponential { scale, .. } => scale * (dim + 40.0),
            Profile::Power { scale, shape, .. } => scale * (dim / shape + 40.0).powf(1.0 / shape),
            Profile::Polynomial { power, rate, .. } => (dim + power + 40.0) / rate,
            Profile::TopHat { radius, .. } => radius,
        }
    }
}

/// Unnormalized law extracted from a shape for one kernel kind.
#[derive(Debug, Clone, Copy)]
enum Law {
    Gaussian(f64),
    Mixture(f64, f64),
    Exponential(f64),
    Power(f64, f64),
    Polynomial(f64, f64),
    TopHat(f64),
}

fn law(shape: &KernelShape, kind: KernelKind) -> Law {
    use KernelKind::{Birth, Death};
    match (*shape, kind) {
        (KernelShape::Normal { sigma_m, .. }, Birth) => Law::Gaussian(sigma_m),
        (KernelShape::Normal { sigma_w, .. }, Death) => Law::Gaussian(sigma_w),
        (KernelShape::Kurtic { s0, s1 }, _) => Law::Mixture(s0, s1),
        (KernelShape::GeneralKurtic { s0m, s1m, .. }, Birth) => Law::Mixture(s0m, s1m),
        (KernelShape::GeneralKurtic { s0w, s1w, .. }, Death) => Law::Mixture(s0w, s1w),
        (KernelShape::Exponential { a, .. }, Birth) => Law::Exponential(a),
        (KernelShape::Exponential { b, .. }, Death) => Law::Exponential(b),
        (KernelShape::Roughgarden { sm, gamma_m, .. }, Birth) => Law::Power(sm, gamma_m),
        (KernelShape::Roughgarden { sw, gamma_w, .. }, Death) => Law::Power(sw, gamma_w),
        (KernelShape::ExponentialPolynomial { am, bm, .. }, Birth) => Law::Polynomial(am, bm),
        (KernelShape::ExponentialPolynomial { aw, bw, .. }, Death) => Law::Polynomial(aw, bw),
        (KernelShape::Constant { birth_radius, .. }, Birth) => Law::TopHat(birth_radius),
        (KernelShape::Constant { death_radius, .. }, Death) => Law::TopHat(death_radius),
    }
}

// =================================================================================================
// Kernel set
// =================================================================================================

/// Birth and death kernels of one shape, normalized in `R^D`.
///
/// # Example
///
/// ```rust
/// use moment_rs::kernels::{KernelKind, KernelSet, KernelShape};
///
/// let kernels = KernelSet::new(KernelShape::Normal { sigma_m: 1.0, sigma_w: 2.0 }, 1)?;
/// let peak = kernels.evaluate(KernelKind::Birth, 0.0);
/// assert!((peak - 1.0 / (2.0 * std::f64::consts::PI).sqrt()).abs() < 1e-12);
/// assert_eq!(kernels.transform(KernelKind::Death, 0.0), 1.0);
/// # Ok::<(), moment_rs::ModelError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSet {
    shape: KernelShape,
    dimension: usize,
    birth: Profile,
    death: Profile,
}

impl KernelSet {
    /// Validate `shape` and bind it to `dimension`.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidKernel`] for an inadmissible parameter,
    /// [`ModelError::InvalidParameter`] for `dimension == 0`.
    pub fn new(shape: KernelShape, dimension: usize) -> Result<Self, ModelError> {
        shape.validate()?;
        if dimension == 0 {
            return Err(ModelError::parameter("dimension", "must be at least 1"));
        }

        Ok(Self {
            shape,
            dimension,
            birth: Profile::resolve(dimension, law(&shape, KernelKind::Birth)),
            death: Profile::resolve(dimension, law(&shape, KernelKind::Death)),
        })
    }

    /// The parameter record this set was built from.
    pub fn shape(&self) -> &KernelShape {
        &self.shape
    }

    /// Dimension the kernels are normalized in.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn profile(&self, kind: KernelKind) -> &Profile {
        match kind {
            KernelKind::Birth => &self.birth,
            KernelKind::Death => &self.death,
        }
    }

    /// Kernel value at distance `r`.
    pub fn evaluate(&self, kind: KernelKind, r: f64) -> f64 {
        self.profile(kind).evaluate(r, self.dimension)
    }

    /// Radial Fourier transform `S_D ∫ r^{D-1} φ_D(kr) k(r) dr` at wave number `k`.
    ///
    /// Equals 1 at `k = 0` (unit mass).
    pub fn transform(&self, kind: KernelKind, k: f64) -> f64 {
        let profile = self.profile(kind);
        match profile.closed_transform(k, self.dimension) {
            Some(value) => value,
            None => numeric_transform(profile, self.dimension, k),
        }
    }

    /// Smallest radius that holds all but `1e-6` of the kernel mass.
    pub fn effective_radius(&self, kind: KernelKind) -> f64 {
        let profile = self.profile(kind);
        if let Profile::TopHat { radius, .. } = profile {
            return *radius;
        }
        quantile(profile, self.dimension, 1.0 - EFFECTIVE_MASS_DEFECT)
    }

    /// Width of the radial band between the quartiles of the kernel mass.
    ///
    /// This is the length scale a grid has to resolve: a step wider than the
    /// spread of either kernel samples it too coarsely to keep its shape.
    pub fn spread(&self, kind: KernelKind) -> f64 {
        let profile = self.profile(kind);
        let (lower, upper) = SPREAD_QUANTILES;
        quantile(profile, self.dimension, upper) - quantile(profile, self.dimension, lower)
    }
}

/// Radius of the ball holding the fraction `target` of the kernel mass.
fn quantile(profile: &Profile, dimension: usize, target: f64) -> f64 {
    if let Profile::TopHat { radius, .. } = profile {
        return radius * target.powf(1.0 / dimension as f64);
    }

    let mut lo = 0.0;
    let mut hi = profile.tail(dimension);
    if mass(profile, dimension, hi) < target {
        return hi;
    }

    while hi - lo > 1e-9 * hi {
        let mid = 0.5 * (lo + hi);
        if mass(profile, dimension, mid) >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

/// Kernel mass inside the ball of radius `radius`.
fn mass(profile: &Profile, dimension: usize, radius: f64) -> f64 {
    let power = dimension as i32 - 1;
    sphere_area(dimension)
        * simpson(
            |r| r.powi(power) * profile.evaluate(r, dimension),
            0.0,
            radius,
            MIN_PANELS,
        )
}

fn numeric_transform(profile: &Profile, dimension: usize, k: f64) -> f64 {
    let upper = profile.tail(dimension);
    let power = dimension as i32 - 1;
    // twenty nodes per oscillation of φ_D(kr)
    let panels = MIN_PANELS.max((4.0 * k * upper).ceil() as usize);
    sphere_area(dimension)
        * simpson(
            |r| r.powi(power) * phi(dimension, k * r) * profile.evaluate(r, dimension),
            0.0,
            upper,
            panels,
        )
}

impl fmt::Display for KernelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            KernelShape::Normal { sigma_m, sigma_w } => {
                write!(f, "Normal kernels: sm = {sigma_m:.5}, sw = {sigma_w:.5}")
            }
            KernelShape::Kurtic { s0, s1 } => {
                write!(f, "Kurtic kernels: s0 = {s0:.5}, s1 = {s1:.5}")
            }
            KernelShape::GeneralKurtic { s0m, s1m, s0w, s1w } => write!(
                f,
                "General kurtic kernels: s0m = {s0m:.5}, s1m = {s1m:.5}, s0w = {s0w:.5}, s1w = {s1w:.5}"
            ),
            KernelShape::Exponential { a, b } => {
                write!(f, "Exponential kernels: A = {a:.5}, B = {b:.5}")
            }
            KernelShape::Roughgarden { sm, gamma_m, sw, gamma_w } => write!(
                f,
                "Roughgarden kernels: sm = {sm:.5}, gamma_m = {gamma_m:.5}, sw = {sw:.5}, gamma_w = {gamma_w:.5}"
            ),
            KernelShape::ExponentialPolynomial { am, bm, aw, bw } => write!(
                f,
                "Exponential polynomial kernels: am = {am:.5}, bm = {bm:.5}, aw = {aw:.5}, bw = {bw:.5}"
            ),
            KernelShape::Constant { birth_radius, death_radius } => write!(
                f,
                "Constant kernels: birth radius = {birth_radius:.5}, death radius = {death_radius:.5}"
            ),
        }?;
        write!(f, " (D = {})", self.dimension)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn all_shapes() -> Vec<KernelShape> {
        vec![
            KernelShape::Normal { sigma_m: 1.0, sigma_w: 0.5 },
            KernelShape::Kurtic { s0: 0.5, s1: 2.0 },
            KernelShape::GeneralKurtic { s0m: 0.5, s1m: 1.5, s0w: 1.0, s1w: 2.0 },
            KernelShape::Exponential { a: 0.7, b: 1.3 },
            KernelShape::Roughgarden { sm: 1.0, gamma_m: 2.0, sw: 0.8, gamma_w: 1.5 },
            KernelShape::ExponentialPolynomial { am: 0.0, bm: 2.0, aw: 1.0, bw: 1.0 },
        ]
    }

    // ====== Normalization Tests ======

    #[test]
    fn test_kernels_integrate_to_one() {
        for dimension in 1..=4 {
            for shape in all_shapes() {
                let kernels = KernelSet::new(shape, dimension).unwrap();
                for kind in [KernelKind::Birth, KernelKind::Death] {
                    let profile = kernels.profile(kind);
                    let total = mass(profile, dimension, profile.tail(dimension));
                    assert_relative_eq!(total, 1.0, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_constant_kernel_density() {
        let kernels = KernelSet::new(
            KernelShape::Constant { birth_radius: 2.0, death_radius: 1.0 },
            3,
        )
        .unwrap();
        let density = 3.0 / (4.0 * PI * 8.0);
        assert_relative_eq!(kernels.evaluate(KernelKind::Birth, 1.9), density, epsilon = 1e-12);
        assert_eq!(kernels.evaluate(KernelKind::Birth, 2.1), 0.0);
        assert_eq!(kernels.evaluate(KernelKind::Death, 1.5), 0.0);
    }

    #[test]
    fn test_kernels_are_non_negative() {
        for shape in all_shapes() {
            let kernels = KernelSet::new(shape, 2).unwrap();
            for i in 0..200 {
                let r = i as f64 * 0.1;
                assert!(kernels.evaluate(KernelKind::Birth, r) >= 0.0);
                assert!(kernels.evaluate(KernelKind::Death, r) >= 0.0);
            }
        }
    }

    // ====== Transform Tests ======

    #[test]
    fn test_transform_at_zero_is_unit_mass() {
        for dimension in [1, 2, 3, 5] {
            for shape in all_shapes() {
                let kernels = KernelSet::new(shape, dimension).unwrap();
                assert_relative_eq!(kernels.transform(KernelKind::Birth, 0.0), 1.0, epsilon = 1e-6);
                assert_relative_eq!(kernels.transform(KernelKind::Death, 0.0), 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_numeric_transform_matches_closed_forms() {
        for dimension in [1, 2, 3] {
            let gauss = Profile::resolve(dimension, Law::Gaussian(0.8));
            let expo = Profile::resolve(dimension, Law::Exponential(0.5));
            for &k in &[0.3, 1.0, 2.5, 6.0] {
                let exact = gauss.closed_transform(k, dimension).unwrap();
                assert_relative_eq!(numeric_transform(&gauss, dimension, k), exact, epsilon = 1e-7);

                let exact = expo.closed_transform(k, dimension).unwrap();
                assert_relative_eq!(numeric_transform(&expo, dimension, k), exact, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_roughgarden_with_shape_two_is_gaussian() {
        // exp(-(r/s)²) is a Gaussian with σ = s/√2
        let rough = KernelSet::new(
            KernelShape::Roughgarden { sm: 1.0, gamma_m: 2.0, sw: 1.0, gamma_w: 2.0 },
            3,
        )
        .unwrap();
        let sigma = 1.0 / 2.0_f64.sqrt();
        let normal = KernelSet::new(KernelShape::Normal { sigma_m: sigma, sigma_w: sigma }, 3).unwrap();
        for &r in &[0.0, 0.5, 1.5] {
            assert_relative_eq!(
                rough.evaluate(KernelKind::Birth, r),
                normal.evaluate(KernelKind::Birth, r),
                epsilon = 1e-12
            );
        }
        for &k in &[0.5, 2.0] {
            assert_relative_eq!(
                rough.transform(KernelKind::Birth, k),
                normal.transform(KernelKind::Birth, k),
                epsilon = 1e-7
            );
        }
    }

    #[test]
    fn test_constant_transform_in_one_dimension_is_sinc() {
        let kernels = KernelSet::new(
            KernelShape::Constant { birth_radius: 1.5, death_radius: 1.0 },
            1,
        )
        .unwrap();
        let k: f64 = 2.0;
        assert_relative_eq!(
            kernels.transform(KernelKind::Birth, k),
            (1.5 * k).sin() / (1.5 * k),
            epsilon = 1e-12
        );
    }

    // ====== Effective Radius Tests ======

    #[test]
    fn test_effective_radius() {
        let kernels = KernelSet::new(KernelShape::Exponential { a: 1.0, b: 2.0 }, 1).unwrap();
        // mass outside r is exp(-r/a)
        assert_relative_eq!(kernels.effective_radius(KernelKind::Birth), 1e6_f64.ln(), epsilon = 1e-4);
        assert_relative_eq!(kernels.effective_radius(KernelKind::Death), 2.0 * 1e6_f64.ln(), epsilon = 1e-4);

        let normal = KernelSet::new(KernelShape::default(), 1).unwrap();
        let radius = normal.effective_radius(KernelKind::Birth);
        assert!(radius > 4.8 && radius < 5.0, "got {radius}");

        let constant = KernelSet::new(
            KernelShape::Constant { birth_radius: 0.7, death_radius: 1.2 },
            2,
        )
        .unwrap();
        assert_eq!(constant.effective_radius(KernelKind::Death), 1.2);
    }

    #[test]
    fn test_spread_is_interquartile_band() {
        // 1D exponential: mass inside r is 1 - exp(-r/a)
        let kernels = KernelSet::new(KernelShape::Exponential { a: 0.2, b: 2.0 }, 1).unwrap();
        assert_relative_eq!(kernels.spread(KernelKind::Birth), 0.2 * 3.0_f64.ln(), epsilon = 1e-6);
        assert_relative_eq!(kernels.spread(KernelKind::Death), 2.0 * 3.0_f64.ln(), epsilon = 1e-5);

        let constant = KernelSet::new(
            KernelShape::Constant { birth_radius: 0.3, death_radius: 3.0 },
            3,
        )
        .unwrap();
        let expected = 0.3 * (0.75_f64.cbrt() - 0.25_f64.cbrt());
        assert_relative_eq!(constant.spread(KernelKind::Birth), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_polynomial_norm_survives_large_powers() {
        // Γ(D + a) and b^(D + a) both overflow here, their ratio does not
        let kernels = KernelSet::new(
            KernelShape::ExponentialPolynomial { am: 200.0, bm: 50.0, aw: 2.0, bw: 400.0 },
            3,
        )
        .unwrap();
        let peak = kernels.evaluate(KernelKind::Birth, 202.0 / 50.0);
        assert!(peak.is_finite() && peak > 0.0, "got {peak}");

        let profile = kernels.profile(KernelKind::Death);
        assert_relative_eq!(mass(profile, 3, profile.tail(3)), 1.0, epsilon = 1e-6);
    }

    // ====== Construction Tests ======

    #[test]
    fn test_invalid_construction() {
        let degenerate = KernelShape::Constant { birth_radius: 0.0, death_radius: 0.0 };
        assert!(matches!(
            KernelSet::new(degenerate, 1),
            Err(ModelError::InvalidKernel { .. })
        ));
        assert!(matches!(
            KernelSet::new(KernelShape::default(), 0),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_display_names_shape() {
        let kernels = KernelSet::new(KernelShape::Kurtic { s0: 0.5, s1: 2.0 }, 2).unwrap();
        let text = kernels.to_string();
        assert!(text.starts_with("Kurtic kernels"));
        assert!(text.contains("0.50000"));
        assert!(text.contains("D = 2"));
    }
}
