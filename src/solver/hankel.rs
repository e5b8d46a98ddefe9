//! Naive discrete Hankel transform (any dimension)
//!
//! Midpoint nodes `r_i = (i + ½) h`, `h = R/n`, and wave numbers
//! `k_j = jπ/R`, `j = 0..n`. Both transforms are dense `O(n²)` sums:
//!
//! ```text
//! F_j = S_D h Σ_i r_i^{D-1} φ_D(k_j r_i) f_i
//! f_i = S_D / (2π)^D Δk Σ_j ω_j k_j^{D-1} φ_D(k_j r_i) F_j      (ω trapezoid weights)
//! ```
//!
//! Convolutions become pointwise products in `k`, kernel transforms come from
//! [`KernelSet::transform`](crate::kernels::KernelSet::transform). The node
//! tables are rescaled to unit mass under the midpoint sum and the transforms
//! to unit value at `k = 0`; in even dimensions the midpoint rule is only
//! second order and would otherwise bias every convolution.

use super::iteration::{ConvolutionScheme, Convolutions};
use crate::error::ModelError;
use crate::kernels::KernelKind;
use crate::model::Problem;
use crate::radial::{phi, sphere_area};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

pub(crate) struct HankelScheme {
    nodes: usize,
    step: f64,
    forward: DMatrix<f64>,
    inverse: DMatrix<f64>,
    birth: DVector<f64>,
    death: DVector<f64>,
    birth_transform: DVector<f64>,
    death_transform: DVector<f64>,
}

impl HankelScheme {
    pub(crate) fn new(problem: &Problem) -> Self {
        let dimension = problem.dimension();
        let nodes = problem.nodes();
        let step = problem.step();
        let dk = PI / problem.radius();
        let power = dimension as i32 - 1;
        let area = sphere_area(dimension);
        let kernels = problem.kernels();

        let r = DVector::from_fn(nodes, |i, _| (i as f64 + 0.5) * step);
        let k = DVector::from_fn(nodes, |j, _| j as f64 * dk);
        let waves = DMatrix::from_fn(nodes, nodes, |j, i| phi(dimension, k[j] * r[i]));

        let forward = DMatrix::from_fn(nodes, nodes, |j, i| area * step * r[i].powi(power) * waves[(j, i)]);
        let inverse_scale = area / (2.0 * PI).powi(dimension as i32) * dk;
        let inverse = DMatrix::from_fn(nodes, nodes, |i, j| {
            let weight = if j == 0 || j == nodes - 1 { 0.5 } else { 1.0 };
            inverse_scale * weight * k[j].powi(power) * waves[(j, i)]
        });

        let table = |kind| {
            let values = r.map(|r| kernels.evaluate(kind, r));
            let mass = forward.row(0).transpose().dot(&values);
            rescale(values, mass)
        };
        let spectrum = |kind| {
            let values = k.map(|k| kernels.transform(kind, k));
            let mass = values[0];
            rescale(values, mass)
        };

        Self {
            nodes,
            step,
            birth: table(KernelKind::Birth),
            death: table(KernelKind::Death),
            birth_transform: spectrum(KernelKind::Birth),
            death_transform: spectrum(KernelKind::Death),
            forward,
            inverse,
        }
    }

    pub(crate) fn forward(&self, f: &DVector<f64>) -> DVector<f64> {
        &self.forward * f
    }

    pub(crate) fn inverse(&self, spectrum: &DVector<f64>) -> DVector<f64> {
        &self.inverse * spectrum
    }
}

fn rescale(values: DVector<f64>, mass: f64) -> DVector<f64> {
    if mass > 0.0 { values / mass } else { values }
}

impl ConvolutionScheme for HankelScheme {
    fn nodes(&self) -> usize {
        self.nodes
    }

    fn step(&self) -> f64 {
        self.step
    }

    fn origin(&self) -> f64 {
        0.5 * self.step
    }

    fn birth(&self) -> &DVector<f64> {
        &self.birth
    }

    fn death(&self) -> &DVector<f64> {
        &self.death
    }

    fn integrate(&self, f: &DVector<f64>) -> f64 {
        // row k = 0 of the forward transform, φ_D(0) = 1
        self.forward.row(0).transpose().dot(f)
    }

    fn convolutions(&self, q: &DVector<f64>, nonlinear: bool) -> Result<Convolutions, ModelError> {
        let q_hat = self.forward(q);
        let birth = self.inverse(&self.birth_transform.component_mul(&q_hat));
        if !nonlinear {
            return Ok(Convolutions::linear(birth));
        }

        let death = self.inverse(&self.death_transform.component_mul(&q_hat));
        let weighted_hat = self.forward(&self.death.component_mul(q));
        let triple = self.inverse(&weighted_hat.component_mul(&q_hat));
        Ok(Convolutions { birth, death, triple })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{KernelSet, KernelShape};
    use crate::model::Radius;
    use approx::assert_relative_eq;

    fn scheme(dimension: usize) -> (HankelScheme, Problem) {
        let problem = Problem::builder()
            .dimension(dimension)
            .kernels(KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 })
            .radius(Radius::Fixed(12.0))
            .nodes(120)
            .build()
            .unwrap();
        (HankelScheme::new(&problem), problem)
    }

    #[test]
    fn test_kernel_mass_on_midpoint_grid() {
        for dimension in [1, 2, 3, 4, 5] {
            let (scheme, _) = scheme(dimension);
            assert_relative_eq!(scheme.integrate(scheme.birth()), 1.0, epsilon = 1e-12);
            assert_relative_eq!(scheme.integrate(scheme.death()), 1.0, epsilon = 1e-12);
            assert_relative_eq!(scheme.birth_transform[0], 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_numeric_transforms_are_rescaled() {
        let problem = Problem::builder()
            .dimension(2)
            .kernels(KernelShape::Roughgarden { sm: 1.0, gamma_m: 1.5, sw: 1.5, gamma_w: 3.0 })
            .radius(Radius::Fixed(12.0))
            .nodes(96)
            .build()
            .unwrap();
        let scheme = HankelScheme::new(&problem);
        assert_relative_eq!(scheme.death_transform[0], 1.0, epsilon = 1e-15);
        assert_relative_eq!(scheme.integrate(scheme.death()), 1.0, epsilon = 1e-12);

        let constant = scheme.continued_birth(&DVector::from_element(96, 0.75)).unwrap();
        assert!(constant.iter().all(|v| (v - 0.75).abs() < 1e-12));
    }

    #[test]
    fn test_round_trip_of_smooth_profile() {
        for dimension in [1, 3, 5] {
            let (scheme, _) = scheme(dimension);
            let f = scheme.birth().clone();
            let back = scheme.inverse(&scheme.forward(&f));
            for i in [0usize, 5, 20] {
                assert_relative_eq!(back[i], f[i], epsilon = 1e-8);
            }
        }
    }

    /// Gaussian convolved with itself is a Gaussian with twice the variance.
    #[test]
    fn test_gaussian_self_convolution() {
        for dimension in [3, 5] {
            let (scheme, _) = scheme(dimension);
            let conv = scheme.convolutions(scheme.birth(), false).unwrap().birth;
            let wide = KernelSet::new(
                KernelShape::Normal { sigma_m: 2.0_f64.sqrt(), sigma_w: 1.0 },
                dimension,
            )
            .unwrap();
            for i in [0usize, 10, 30] {
                let r = (i as f64 + 0.5) * 0.1;
                assert_relative_eq!(conv[i], wide.evaluate(KernelKind::Birth, r), epsilon = 1e-7);
            }
        }
    }
}
