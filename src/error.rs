//! Error taxonomy
//!
//! Three families of failure exist in this crate:
//!
//! - **Configuration** (`InvalidKernel`, `InvalidParameter`, `Parse`): raised
//!   while building a [`Problem`](crate::model::Problem), before any solver runs.
//! - **Applicability** (`UnsupportedDimension`): a concrete solver was invoked
//!   directly on a dimension it cannot discretize. The dispatcher never does this.
//! - **Runtime** (`Numerical`, `Transform`, `Io`): a singular Nystrom system,
//!   a NaN or a diverging iterate, an FFT backend failure, a failed vector dump.
//!
//! Reaching the iteration ceiling without diverging is *not* an error: the
//! last iterate is returned.

use thiserror::Error;

/// Errors produced by the equilibrium solver.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A kernel parameter violates the positivity its formula requires.
    #[error("invalid {shape} kernel parameter `{parameter}` = {value}: {reason}")]
    InvalidKernel {
        shape: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A model or discretization parameter is out of range.
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    /// Command-line arguments could not be interpreted.
    #[error("{0}")]
    Parse(String),

    /// The requested solver cannot handle this dimensionality.
    #[error("{solver} supports dimensions {supported}, got {dimension}")]
    UnsupportedDimension {
        solver: &'static str,
        supported: &'static str,
        dimension: usize,
    },

    /// The numerical scheme produced an unusable state.
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// The FFT backend reported an error.
    #[error("transform backend failure: {0}")]
    Transform(String),

    /// Writing the vector dump failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Shorthand for [`ModelError::InvalidParameter`].
    pub(crate) fn parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// True for the errors that are reported before any solve starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidKernel { .. } | Self::InvalidParameter { .. } | Self::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        let kernel = ModelError::InvalidKernel {
            shape: "constant",
            parameter: "birth_radius",
            value: 0.0,
            reason: "must be positive",
        };
        assert!(kernel.is_configuration());
        assert!(ModelError::Parse("bad flag".to_string()).is_configuration());
        assert!(!ModelError::Numerical("NaN".to_string()).is_configuration());
    }

    #[test]
    fn test_kernel_error_message() {
        let err = ModelError::InvalidKernel {
            shape: "normal",
            parameter: "sigma_m",
            value: -1.0,
            reason: "must be positive",
        };
        let message = err.to_string();
        assert!(message.contains("normal"));
        assert!(message.contains("sigma_m"));
        assert!(message.contains("-1"));
    }
}
