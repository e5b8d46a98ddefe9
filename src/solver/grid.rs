//! Direct radial quadrature on a uniform grid (1D and 3D)
//!
//! # Discretization
//!
//! Nodes `x_i = i·h`, `h = R/n`, `i = 0..n`. The unknown `Q` is taken to be
//! zero beyond the last node; kernels are sampled out to `2R` so that every
//! distance `|x_i ± x_j|` stays inside the table.
//!
//! For radial `f` and `g` the convolution `(f*g)(x) = ∫ f(|y|) g(|x-y|) dy`
//! reduces to a signed one-dimensional sum
//!
//! ```text
//! raw_i = Σ_{j=-(n-1)}^{n-1} u_j p(|i-j|)
//!
//! 1D:  u_j = f(|x_j|),   p(t) = g(t h),                   (f*g)(x_i) = h raw_i
//! 3D:  u_j = x_j f(|x_j|), p(t) = ∫_{th}^∞ s g(s) ds,       (f*g)(x_i) = 2π h raw_i / x_i
//! ```
//!
//! with `(f*g)(0) = 4π h Σ_j x_j² f_j g_j` in 3D. The same `u` and `p` feed the
//! FFT scheme in [`super::spectral`] and the Nystrom matrix, which makes the
//! three evaluations agree to rounding.
//!
//! Sampled kernels are rescaled to unit mass under the grid's own
//! quadrature: the node tables under [`ConvolutionScheme::integrate`], the
//! profiles so that `(1*k)(x_i) = 1` away from the boundary. Coarse grids
//! would otherwise gain or lose mass on every convolution.

use super::iteration::{ConvolutionScheme, Convolutions};
use crate::error::ModelError;
use crate::kernels::KernelKind;
use crate::model::Problem;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Geometry {
    Line,
    Sphere,
}

/// Uniform radial grid with kernel tables.
#[derive(Debug, Clone)]
pub(crate) struct RadialGrid {
    geometry: Geometry,
    nodes: usize,
    step: f64,
    birth: DVector<f64>,
    death: DVector<f64>,
    birth_profile: Vec<f64>,
    death_profile: Vec<f64>,
}

impl RadialGrid {
    /// Tabulate the kernels of `problem`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedDimension`] outside 1D and 3D, attributed to `solver`.
    pub(crate) fn new(problem: &Problem, solver: &'static str) -> Result<Self, ModelError> {
        let geometry = match problem.dimension() {
            1 => Geometry::Line,
            3 => Geometry::Sphere,
            dimension => {
                return Err(ModelError::UnsupportedDimension {
                    solver,
                    supported: "1 and 3",
                    dimension,
                });
            }
        };

        let nodes = problem.nodes();
        let step = problem.step();
        let kernels = problem.kernels();
        let samples = |kind| -> Vec<f64> {
            (0..=2 * nodes)
                .map(|t| kernels.evaluate(kind, t as f64 * step))
                .collect()
        };
        let mut grid = Self {
            geometry,
            nodes,
            step,
            birth: DVector::zeros(0),
            death: DVector::zeros(0),
            birth_profile: Vec::new(),
            death_profile: Vec::new(),
        };

        let birth_samples = grid.unit_mass(samples(KernelKind::Birth));
        let death_samples = grid.unit_mass(samples(KernelKind::Death));
        grid.birth = DVector::from_column_slice(&birth_samples[..nodes]);
        grid.death = DVector::from_column_slice(&death_samples[..nodes]);
        grid.birth_profile = grid.unit_profile(grid.profile(&birth_samples));
        grid.death_profile = grid.unit_profile(grid.profile(&death_samples));
        Ok(grid)
    }

    /// Quadrature `∫_{R^D} f` over as many samples as `f` holds.
    fn mass(&self, f: &[f64]) -> f64 {
        let h = self.step;
        match self.geometry {
            Geometry::Line => h * (f[0] + 2.0 * f[1..].iter().sum::<f64>()),
            Geometry::Sphere => {
                4.0 * PI * h * f.iter().enumerate().map(|(j, v)| self.x(j).powi(2) * v).sum::<f64>()
            }
        }
    }

    fn unit_mass(&self, mut samples: Vec<f64>) -> Vec<f64> {
        let mass = self.mass(&samples);
        if mass > 0.0 {
            samples.iter_mut().for_each(|v| *v /= mass);
        }
        samples
    }

    /// Scale `p` so that the signed sum of a constant is reproduced exactly.
    fn unit_profile(&self, mut profile: Vec<f64>) -> Vec<f64> {
        let factor = match self.geometry {
            Geometry::Line => self.step,
            Geometry::Sphere => 2.0 * PI * self.step,
        };
        let total = factor * (profile[0] + 2.0 * profile[1..].iter().sum::<f64>());
        if total > 0.0 {
            profile.iter_mut().for_each(|v| *v /= total);
        }
        profile
    }

    fn x(&self, i: usize) -> f64 {
        i as f64 * self.step
    }

    pub(crate) fn kernel_profile(&self, kind: KernelKind) -> &[f64] {
        match kind {
            KernelKind::Birth => &self.birth_profile,
            KernelKind::Death => &self.death_profile,
        }
    }

    /// Signed weights `u_j`, `j = -(n-1)..=n-1`, stored at index `j + n - 1`.
    pub(crate) fn signed_weights(&self, f: &[f64]) -> Vec<f64> {
        let n = self.nodes as isize;
        (-(n - 1)..n)
            .map(|j| {
                let value = f[j.unsigned_abs()];
                match self.geometry {
                    Geometry::Line => value,
                    Geometry::Sphere => j as f64 * self.step * value,
                }
            })
            .collect()
    }

    /// Profile `p(t)`, `t = 0..=2n-2`, from samples `g(t h)`; zero past the samples.
    pub(crate) fn profile(&self, g: &[f64]) -> Vec<f64> {
        let len = 2 * self.nodes - 1;
        let sample = |t: usize| g.get(t).copied().unwrap_or(0.0);
        match self.geometry {
            Geometry::Line => (0..len).map(sample).collect(),
            Geometry::Sphere => {
                // trapezoid tail integral of s g(s), from the last sample inwards
                let last = g.len().max(len);
                let mut tail = vec![0.0; last + 1];
                for t in (0..last).rev() {
                    let left = self.x(t) * sample(t);
                    let right = self.x(t + 1) * sample(t + 1);
                    tail[t] = tail[t + 1] + 0.5 * self.step * (left + right);
                }
                tail.truncate(len);
                tail
            }
        }
    }

    /// Turn raw sums into convolution values; `f` and `g` are the node values
    /// used for the 3D origin.
    pub(crate) fn finish(&self, raw: &[f64], f: &[f64], g: &[f64]) -> DVector<f64> {
        let h = self.step;
        match self.geometry {
            Geometry::Line => DVector::from_iterator(self.nodes, raw.iter().map(|r| h * r)),
            Geometry::Sphere => DVector::from_fn(self.nodes, |i, _| {
                if i == 0 {
                    4.0 * PI * h * (0..self.nodes).map(|j| self.x(j).powi(2) * f[j] * g[j]).sum::<f64>()
                } else {
                    2.0 * PI * h * raw[i] / self.x(i)
                }
            }),
        }
    }

    /// Raw sums by direct `O(n²)` evaluation.
    fn direct(&self, weights: &[f64], profile: &[f64]) -> Vec<f64> {
        let n = self.nodes;
        let point = |i: usize| -> f64 {
            weights
                .iter()
                .enumerate()
                .map(|(k, u)| {
                    let j = k as isize - (n as isize - 1);
                    u * profile[(i as isize - j).unsigned_abs()]
                })
                .sum()
        };

        let mut raw = vec![0.0; n];

        #[cfg(feature = "parallel")]
        {
            if n >= super::parallel_threshold() {
                raw.par_iter_mut().enumerate().for_each(|(i, value)| *value = point(i));
                return raw;
            }
        }

        for (i, value) in raw.iter_mut().enumerate() {
            *value = point(i);
        }
        raw
    }

    /// `f * g` for node values `f` and samples `g`.
    pub(crate) fn convolve_samples(&self, f: &[f64], g: &[f64]) -> DVector<f64> {
        let raw = self.direct(&self.signed_weights(f), &self.profile(g));
        self.finish(&raw, f, g)
    }

    /// `f * k` for a tabulated kernel.
    pub(crate) fn convolve_kernel(&self, f: &[f64], kind: KernelKind) -> DVector<f64> {
        let raw = self.direct(&self.signed_weights(f), self.kernel_profile(kind));
        self.finish(&raw, f, self.kernel_nodes(kind).as_slice())
    }

    pub(crate) fn kernel_nodes(&self, kind: KernelKind) -> &DVector<f64> {
        match kind {
            KernelKind::Birth => &self.birth,
            KernelKind::Death => &self.death,
        }
    }

    /// Matrix `A` with `(k*Q)_i = Σ_j A_ij Q_j` under the same quadrature.
    pub(crate) fn convolution_matrix(&self, kind: KernelKind) -> DMatrix<f64> {
        let n = self.nodes;
        let h = self.step;
        let profile = self.kernel_profile(kind);
        let values = self.kernel_nodes(kind);

        DMatrix::from_fn(n, n, |i, k| match self.geometry {
            Geometry::Line => {
                if k == 0 {
                    h * profile[i]
                } else {
                    h * (profile[i.abs_diff(k)] + profile[i + k])
                }
            }
            Geometry::Sphere => {
                if i == 0 {
                    4.0 * PI * h * self.x(k).powi(2) * values[k]
                } else {
                    2.0 * PI * h * self.x(k) * (profile[i.abs_diff(k)] - profile[i + k]) / self.x(i)
                }
            }
        })
    }

    /// Birth matrix acting on `Q` continued past the last node by `Q_{n-1}`.
    ///
    /// The mass each row loses beyond `R` is folded onto the last column,
    /// so every row sums to one.
    pub(crate) fn continued_birth_matrix(&self) -> DMatrix<f64> {
        let mut matrix = self.convolution_matrix(KernelKind::Birth);
        let last = self.nodes - 1;
        for i in 0..self.nodes {
            let lost = 1.0 - matrix.row(i).sum();
            matrix[(i, last)] += lost;
        }
        matrix
    }
}

impl ConvolutionScheme for RadialGrid {
    fn nodes(&self) -> usize {
        self.nodes
    }

    fn step(&self) -> f64 {
        self.step
    }

    fn origin(&self) -> f64 {
        0.0
    }

    fn birth(&self) -> &DVector<f64> {
        &self.birth
    }

    fn death(&self) -> &DVector<f64> {
        &self.death
    }

    fn integrate(&self, f: &DVector<f64>) -> f64 {
        self.mass(f.as_slice())
    }

    fn convolutions(&self, q: &DVector<f64>, nonlinear: bool) -> Result<Convolutions, ModelError> {
        let birth = self.convolve_kernel(q.as_slice(), KernelKind::Birth);
        if !nonlinear {
            return Ok(Convolutions::linear(birth));
        }

        let death = self.convolve_kernel(q.as_slice(), KernelKind::Death);
        let weighted = self.death.component_mul(q);
        let triple = self.convolve_samples(weighted.as_slice(), q.as_slice());
        Ok(Convolutions { birth, death, triple })
    }
}
