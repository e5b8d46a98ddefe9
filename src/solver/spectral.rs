//! FFT evaluation of the radial quadrature sums (1D and 3D)
//!
//! The direct sums of [`super::grid`] are linear convolutions of the signed
//! weights `u` (length `2n-1`) with the mirrored profile
//! `b_k = p(|k - (2n-2)|)` (length `4n-3`):
//!
//! ```text
//! raw_i = (u ⊛ b)_{i + 3n - 3}
//! ```
//!
//! Both sequences are zero-padded to the next power of two above `6n-5` and
//! multiplied in the frequency domain, so one iteration costs `O(n log n)`.
//! Kernel spectra are computed once per solve.

use super::grid::RadialGrid;
use super::iteration::{ConvolutionScheme, Convolutions};
use crate::error::ModelError;
use crate::kernels::KernelKind;
use crate::model::Problem;
use nalgebra::DVector;
use numr::algorithm::fft::{FftAlgorithms, FftNormalization};
use numr::dtype::Complex128;
use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use numr::tensor::Tensor;

/// Real FFT linear convolution of fixed padded length.
pub(crate) struct FftConvolver {
    client: CpuClient,
    device: CpuDevice,
    padded: usize,
}

impl FftConvolver {
    /// Convolver able to hold a full linear convolution of `len` samples.
    pub(crate) fn new(len: usize) -> Self {
        let device = CpuDevice::new();
        let client = CpuClient::new(device.clone());
        Self {
            client,
            device,
            padded: len.next_power_of_two(),
        }
    }

    pub(crate) fn padded_len(&self) -> usize {
        self.padded
    }

    /// Spectrum of `data` zero-padded to the working length.
    pub(crate) fn spectrum(&self, data: &[f64]) -> Result<Vec<Complex128>, ModelError> {
        let mut padded = vec![0.0; self.padded];
        padded[..data.len()].copy_from_slice(data);
        let tensor = Tensor::<CpuRuntime>::from_slice(&padded, &[self.padded], &self.device)
            .map_err(|e| ModelError::Transform(e.to_string()))?;
        let spectrum = self
            .client
            .rfft(&tensor, FftNormalization::None)
            .map_err(|e| ModelError::Transform(e.to_string()))?;
        Ok(spectrum.to_vec())
    }

    /// Inverse transform of the pointwise product of two spectra.
    pub(crate) fn inverse_product(&self, a: &[Complex128], b: &[Complex128]) -> Result<Vec<f64>, ModelError> {
        let product: Vec<Complex128> = a
            .iter()
            .zip(b)
            .map(|(x, y)| Complex128::new(x.re * y.re - x.im * y.im, x.re * y.im + x.im * y.re))
            .collect();
        let tensor = Tensor::<CpuRuntime>::from_slice(&product, &[product.len()], &self.device)
            .map_err(|e| ModelError::Transform(e.to_string()))?;
        let signal = self
            .client
            .irfft(&tensor, Some(self.padded), FftNormalization::Backward)
            .map_err(|e| ModelError::Transform(e.to_string()))?;
        Ok(signal.to_vec())
    }
}

/// FFT-backed convolution scheme on the direct radial grid.
pub(crate) struct SpectralScheme {
    grid: RadialGrid,
    fft: FftConvolver,
    birth_spectrum: Vec<Complex128>,
    death_spectrum: Vec<Complex128>,
}

impl SpectralScheme {
    pub(crate) fn new(problem: &Problem, solver: &'static str) -> Result<Self, ModelError> {
        let grid = RadialGrid::new(problem, solver)?;
        let n = problem.nodes();
        let fft = FftConvolver::new(6 * n - 5);

        let birth_spectrum = fft.spectrum(&mirror(grid.kernel_profile(KernelKind::Birth)))?;
        let death_spectrum = fft.spectrum(&mirror(grid.kernel_profile(KernelKind::Death)))?;
        log::debug!("{solver}: FFT length {} for {n} nodes", fft.padded_len());

        Ok(Self {
            grid,
            fft,
            birth_spectrum,
            death_spectrum,
        })
    }

    /// Pick the quadrature sums out of the full linear convolution.
    fn extract(&self, full: &[f64]) -> Vec<f64> {
        let n = self.grid.nodes();
        full[3 * n - 3..4 * n - 3].to_vec()
    }
}

/// `b_k = p(|k - (2n-2)|)` for a profile of length `2n-1`.
fn mirror(profile: &[f64]) -> Vec<f64> {
    profile.iter().rev().chain(profile.iter().skip(1)).copied().collect()
}

impl ConvolutionScheme for SpectralScheme {
    fn nodes(&self) -> usize {
        self.grid.nodes()
    }

    fn step(&self) -> f64 {
        self.grid.step()
    }

    fn origin(&self) -> f64 {
        0.0
    }

    fn birth(&self) -> &DVector<f64> {
        self.grid.birth()
    }

    fn death(&self) -> &DVector<f64> {
        self.grid.death()
    }

    fn integrate(&self, f: &DVector<f64>) -> f64 {
        self.grid.integrate(f)
    }

    fn convolutions(&self, q: &DVector<f64>, nonlinear: bool) -> Result<Convolutions, ModelError> {
        let q = q.as_slice();
        let q_spectrum = self.fft.spectrum(&self.grid.signed_weights(q))?;

        let raw = self.extract(&self.fft.inverse_product(&q_spectrum, &self.birth_spectrum)?);
        let birth = self.grid.finish(&raw, q, self.grid.kernel_nodes(KernelKind::Birth).as_slice());
        if !nonlinear {
            return Ok(Convolutions::linear(birth));
        }

        let raw = self.extract(&self.fft.inverse_product(&q_spectrum, &self.death_spectrum)?);
        let death = self.grid.finish(&raw, q, self.grid.kernel_nodes(KernelKind::Death).as_slice());

        let weighted = self.grid.death().component_mul(&DVector::from_column_slice(q));
        let weighted_spectrum = self.fft.spectrum(&self.grid.signed_weights(weighted.as_slice()))?;
        let profile_spectrum = self.fft.spectrum(&mirror(&self.grid.profile(q)))?;
        let raw = self.extract(&self.fft.inverse_product(&weighted_spectrum, &profile_spectrum)?);
        let triple = self.grid.finish(&raw, weighted.as_slice(), q);

        Ok(Convolutions { birth, death, triple })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::KernelShape;
    use crate::model::Radius;
    use approx::assert_relative_eq;

    #[test]
    fn test_mirror_layout() {
        assert_eq!(mirror(&[1.0, 2.0, 3.0]), vec![3.0, 2.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_fft_linear_convolution() {
        let fft = FftConvolver::new(5);
        assert_eq!(fft.padded_len(), 8);
        let a = fft.spectrum(&[1.0, 2.0, 3.0]).unwrap();
        let b = fft.spectrum(&[0.0, 1.0, 0.5]).unwrap();
        let full = fft.inverse_product(&a, &b).unwrap();
        let expected = [0.0, 1.0, 2.5, 4.0, 1.5, 0.0, 0.0, 0.0];
        for (value, expected) in full.iter().zip(expected) {
            assert_relative_eq!(*value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spectral_matches_direct_grid() {
        for dimension in [1, 3] {
            let problem = Problem::builder()
                .dimension(dimension)
                .kernels(KernelShape::Exponential { a: 0.8, b: 1.2 })
                .radius(Radius::Fixed(9.0))
                .nodes(37)
                .build()
                .unwrap();
            let grid = RadialGrid::new(&problem, "direct").unwrap();
            let spectral = SpectralScheme::new(&problem, "fft").unwrap();

            let q = DVector::from_fn(37, |i, _| 0.4 * (-(i as f64) * 0.3).exp() - 0.01);
            let direct = grid.convolutions(&q, true).unwrap();
            let fast = spectral.convolutions(&q, true).unwrap();
            for i in 0..37 {
                assert_relative_eq!(direct.birth[i], fast.birth[i], epsilon = 1e-12);
                assert_relative_eq!(direct.death[i], fast.death[i], epsilon = 1e-12);
                assert_relative_eq!(direct.triple[i], fast.triple[i], epsilon = 1e-12);
            }
        }
    }
}
