//! Helper functions for integration tests

use moment_rs::kernels::KernelShape;
use moment_rs::model::{ProblemBuilder, Problem, Radius};
use nalgebra::DVector;

/// Assert that two vectors agree elementwise within a relative tolerance
pub fn assert_vectors_close(a: &DVector<f64>, b: &DVector<f64>, tolerance: f64, message: &str) {
    assert_eq!(a.len(), b.len(), "{}: Dimension mismatch", message);

    for (i, (&v1, &v2)) in a.iter().zip(b.iter()).enumerate() {
        let error = relative_error(v1, v2);
        assert!(
            error < tolerance,
            "{}: Element {} differs ({} vs {}, relative error {:e}, tolerance {:e})",
            message, i, v1, v2, error, tolerance
        );
    }
}

/// Builder for a problem with unit normal kernels on a fixed radius
pub fn normal_problem(dimension: usize, radius: f64, nodes: usize) -> ProblemBuilder {
    Problem::builder()
        .dimension(dimension)
        .kernels(KernelShape::Normal { sigma_m: 1.0, sigma_w: 1.0 })
        .radius(Radius::Fixed(radius))
        .nodes(nodes)
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
