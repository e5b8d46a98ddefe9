//! Radial geometry in `D` dimensions
//!
//! Every function handled by the solvers is radially symmetric, so a
//! `D`-dimensional integral collapses to a one-dimensional one weighted by the
//! area of the unit sphere:
//!
//! ```text
//! ∫_{R^D} f(|x|) dx = S_D ∫_0^∞ r^{D-1} f(r) dr,      S_D = 2 π^{D/2} / Γ(D/2)
//! ```
//!
//! The radial Fourier (Hankel) transform uses the normalized spherical mean
//! of a plane wave,
//!
//! ```text
//! φ_D(x) = Γ(D/2) (2/x)^{D/2-1} J_{D/2-1}(x),     φ_1 = cos x,  φ_3 = sin x / x
//! ```
//!
//! so that `f̂(k) = S_D ∫ r^{D-1} φ_D(kr) f(r) dr` and
//! `f(r) = S_D / (2π)^D ∫ k^{D-1} φ_D(kr) f̂(k) dk`.

use numr::algorithm::special::scalar as numr_special;
use std::f64::consts::PI;

/// Below this argument the power series of `J_ν` / `φ_D` is used.
const SERIES_LIMIT: f64 = 8.0;

/// Relative size at which a series term is considered negligible.
const SERIES_EPSILON: f64 = 1e-17;

/// Gamma function.
pub fn gamma(x: f64) -> f64 {
    numr_special::gamma_scalar(x)
}

/// Natural logarithm of the gamma function.
pub fn ln_gamma(x: f64) -> f64 {
    numr_special::lgamma_scalar(x)
}

/// Area of the unit sphere in `R^D` (`S_1 = 2`, `S_2 = 2π`, `S_3 = 4π`).
pub fn sphere_area(dimension: usize) -> f64 {
    let half = dimension as f64 / 2.0;
    2.0 * PI.powf(half) / gamma(half)
}

/// Volume of the ball of radius `radius` in `R^D`.
pub fn ball_volume(dimension: usize, radius: f64) -> f64 {
    let half = dimension as f64 / 2.0;
    PI.powf(half) * radius.powi(dimension as i32) / gamma(half + 1.0)
}

/// Bessel function of the first kind `J_ν(x)` for `ν ≥ -1/2`, `x ≥ 0`.
///
/// Only integer and half-integer orders occur (`ν = D/2 - 1`):
///
/// - small arguments: power series
/// - integer orders: trapezoidal rule on the Bessel integral over a full
///   period, which converges geometrically once the node count exceeds `x + ν`
/// - half-integer orders: spherical Bessel upward recurrence
pub fn bessel_j(nu: f64, x: f64) -> f64 {
    debug_assert!(nu >= -0.5, "order {nu} below -1/2");
    let x = x.abs();

    if x == 0.0 {
        return if nu == 0.0 {
            1.0
        } else if nu > 0.0 {
            0.0
        } else {
            f64::INFINITY
        };
    }

    let half_integer = (nu - 0.5).fract() == 0.0;
    let spherical_order = nu - 0.5;

    if x < SERIES_LIMIT || (half_integer && x < spherical_order + 1.0) {
        return bessel_series(nu, x);
    }

    if nu.fract() == 0.0 {
        // J_n(x) = 1/2π ∫_0^{2π} cos(nτ - x sin τ) dτ
        let nodes = (x + nu + 40.0).ceil() as usize;
        let sum: f64 = (0..nodes)
            .map(|k| {
                let tau = 2.0 * PI * k as f64 / nodes as f64;
                (nu * tau - x * tau.sin()).cos()
            })
            .sum();
        return sum / nodes as f64;
    }

    // J_{l+1/2}(x) = sqrt(2x/π) j_l(x), starting from j_{-1} = cos x / x, j_0 = sin x / x
    let order = spherical_order.round() as i64;
    let mut previous = x.cos() / x;
    let mut current = x.sin() / x;
    if order == -1 {
        current = previous;
    } else {
        for l in 0..order {
            let next = (2 * l + 1) as f64 / x * current - previous;
            previous = current;
            current = next;
        }
    }
    (2.0 * x / PI).sqrt() * current
}

fn bessel_series(nu: f64, x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = half.powf(nu) / gamma(nu + 1.0);
    let mut sum = term;
    for k in 1..300 {
        let k = k as f64;
        term *= -half * half / (k * (k + nu));
        sum += term;
        if term.abs() < SERIES_EPSILON * sum.abs() {
            break;
        }
    }
    sum
}

/// Normalized spherical mean `φ_D(x)` of a plane wave in `R^D`.
///
/// `φ_D(0) = 1` for every dimension.
pub fn phi(dimension: usize, x: f64) -> f64 {
    let x = x.abs();
    match dimension {
        1 => x.cos(),
        3 => {
            if x < 1e-4 {
                1.0 - x * x / 6.0
            } else {
                x.sin() / x
            }
        }
        _ => {
            let nu = dimension as f64 / 2.0 - 1.0;
            if x < SERIES_LIMIT {
                // Σ (-x²/4)^k / (k! (ν+1)_k)
                let quarter = -x * x / 4.0;
                let mut term = 1.0;
                let mut sum = 1.0;
                for k in 1..300 {
                    let k = k as f64;
                    term *= quarter / (k * (k + nu));
                    sum += term;
                    if term.abs() < SERIES_EPSILON * sum.abs() {
                        break;
                    }
                }
                sum
            } else {
                gamma(nu + 1.0) * (2.0 / x).powf(nu) * bessel_j(nu, x)
            }
        }
    }
}

/// Composite Simpson rule on `[a, b]` with `panels` sub-intervals (rounded up to even).
pub fn simpson<F>(f: F, a: f64, b: f64, panels: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let panels = panels.max(2).next_multiple_of(2);
    let h = (b - a) / panels as f64;
    let interior: f64 = (1..panels)
        .map(|i| {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            weight * f(a + i as f64 * h)
        })
        .sum();
    (f(a) + interior + f(b)) * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_area_low_dimensions() {
        assert_relative_eq!(sphere_area(1), 2.0, epsilon = 1e-12);
        assert_relative_eq!(sphere_area(2), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(sphere_area(3), 4.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_ball_volume() {
        assert_relative_eq!(ball_volume(1, 2.0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(ball_volume(2, 1.0), PI, epsilon = 1e-12);
        assert_relative_eq!(ball_volume(3, 1.0), 4.0 * PI / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bessel_reference_values() {
        // Abramowitz & Stegun table 9.1
        assert_relative_eq!(bessel_j(0.0, 1.0), 0.765_197_686_557_966_6, epsilon = 1e-12);
        assert_relative_eq!(bessel_j(1.0, 1.0), 0.440_050_585_744_933_5, epsilon = 1e-12);
        assert_relative_eq!(bessel_j(0.0, 10.0), -0.245_935_764_451_348_3, epsilon = 1e-10);
        assert_relative_eq!(bessel_j(1.0, 10.0), 0.043_472_746_168_861_44, epsilon = 1e-10);
        assert!(bessel_j(0.0, 2.404_825_557_695_773).abs() < 1e-12);
    }

    #[test]
    fn test_half_integer_orders_match_closed_forms() {
        for &x in &[0.5, 3.0, 9.0, 25.0] {
            let expected = (2.0 / (PI * x)).sqrt() * x.sin();
            assert_relative_eq!(bessel_j(0.5, x), expected, epsilon = 1e-10);

            let expected = (2.0 / (PI * x)).sqrt() * (x.sin() / x - x.cos());
            assert_relative_eq!(bessel_j(1.5, x), expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_phi_general_path_agrees_with_closed_forms() {
        // φ_5(x) = 3 (sin x - x cos x) / x³
        for &x in &[0.3_f64, 4.0, 12.0, 40.0] {
            let expected = 3.0 * (x.sin() - x * x.cos()) / x.powi(3);
            assert_relative_eq!(phi(5, x), expected, epsilon = 1e-9);
        }
        for &x in &[0.0, 1.0, 10.0] {
            assert_relative_eq!(phi(2, x), bessel_j(0.0, x), epsilon = 1e-12);
        }
        assert_eq!(phi(4, 0.0), 1.0);
    }

    #[test]
    fn test_simpson_polynomial_is_exact() {
        let value = simpson(|x| x * x * x - 2.0 * x, 0.0, 2.0, 4);
        assert_relative_eq!(value, 0.0, epsilon = 1e-12);
        let value = simpson(|x| x.sin(), 0.0, PI, 200);
        assert_relative_eq!(value, 2.0, epsilon = 1e-8);
    }
}
