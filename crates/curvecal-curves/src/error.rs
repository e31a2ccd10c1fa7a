//! Error types for curve operations.
//!
//! This module provides error handling for curve construction, instrument
//! validation, calibration, and configuration loading.

use curvecal_math::MathError;
use thiserror::Error;

use crate::config::ValidationError;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// Malformed input (lengths, ordering, non-finite data, bad parameters).
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// Requested tenor is outside the curve's valid range.
    #[error("Tenor {requested:.4} out of range [{min:.4}, {max:.4}]")]
    TenorOutOfRange {
        /// The requested tenor in years.
        requested: f64,
        /// Minimum valid tenor.
        min: f64,
        /// Maximum valid tenor.
        max: f64,
    },

    /// Not enough data points.
    #[error("Insufficient points: need at least {required}, got {got}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points provided.
        got: usize,
    },

    /// Tenors are not strictly increasing.
    #[error("Non-monotonic tenors at index {index}: {prev:.4} >= {current:.4}")]
    NonMonotonicTenors {
        /// Index where monotonicity violation occurred.
        index: usize,
        /// Previous tenor value.
        prev: f64,
        /// Current tenor value.
        current: f64,
    },

    /// Invalid value (NaN, Inf, or domain error).
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of why value is invalid.
        reason: String,
    },

    /// No sign change found while bracketing a root.
    #[error("Bracketing failed after {attempts} expansions (last interval [{lo}, {hi}])")]
    Bracketing {
        /// Last lower bound tried.
        lo: f64,
        /// Last upper bound tried.
        hi: f64,
        /// Number of expansions attempted.
        attempts: u32,
    },

    /// Newton calibration ran out of iterations.
    #[error("Calibration did not converge after {iterations} iterations (max residual: {max_residual:.2e})")]
    ConvergenceFailure {
        /// Number of Newton steps taken.
        iterations: u32,
        /// Largest absolute residual at the last iterate.
        max_residual: f64,
        /// Node values at the last iterate.
        node_values: Vec<f64>,
        /// Residuals at the last iterate, in instrument order.
        residuals: Vec<f64>,
    },

    /// The Jacobian could not be factorized.
    #[error("Singular Jacobian at iteration {iteration}: pivot {pivot:.2e} in column {column}")]
    SingularJacobian {
        /// Newton iteration at which the factorization failed.
        iteration: u32,
        /// Column (node) at which elimination broke down.
        column: usize,
        /// The offending pivot.
        pivot: f64,
    },

    /// Numerical routine failed.
    #[error("Math error: {0}")]
    Math(MathError),

    /// A configuration field failed validation.
    #[error("Validation error: {field}: {message}")]
    Validation {
        /// Field that failed validation.
        field: String,
        /// Validation error message.
        message: String,
    },

    /// Several configuration fields failed validation.
    #[error("Multiple validation errors: {0:?}")]
    MultipleValidationErrors(Vec<ValidationError>),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of the failure.
        reason: String,
    },
}

impl CurveError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a tenor out of range error.
    #[must_use]
    pub fn tenor_out_of_range(requested: f64, min: f64, max: f64) -> Self {
        Self::TenorOutOfRange {
            requested,
            min,
            max,
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

impl From<MathError> for CurveError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InvalidInput { reason } => Self::InvalidInput { reason },
            MathError::BracketingFailed { lo, hi, attempts } => {
                Self::Bracketing { lo, hi, attempts }
            }
            MathError::ExtrapolationNotAllowed { x, min, max } => {
                Self::tenor_out_of_range(x, min, max)
            }
            MathError::InsufficientData { required, actual } => Self::InsufficientPoints {
                required,
                got: actual,
            },
            other => Self::Math(other),
        }
    }
}

impl From<toml::de::Error> for CurveError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<toml::ser::Error> for CurveError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for CurveError {
    fn from(err: std::io::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_error_mapping() {
        let err: CurveError = MathError::BracketingFailed {
            lo: 0.0,
            hi: 1.0,
            attempts: 50,
        }
        .into();
        assert!(matches!(err, CurveError::Bracketing { attempts: 50, .. }));

        let err: CurveError = MathError::ExtrapolationNotAllowed {
            x: 31.0,
            min: 0.0,
            max: 30.0,
        }
        .into();
        assert!(matches!(err, CurveError::TenorOutOfRange { .. }));

        let err: CurveError = MathError::singular_matrix(2, 0.0).into();
        assert!(matches!(err, CurveError::Math(MathError::SingularMatrix { column: 2, .. })));
    }

    #[test]
    fn test_convergence_failure_display() {
        let err = CurveError::ConvergenceFailure {
            iterations: 20,
            max_residual: 1.5e-3,
            node_values: vec![0.03],
            residuals: vec![1.5e-3],
        };
        let msg = err.to_string();
        assert!(msg.contains("20 iterations"));
        assert!(msg.contains("1.50e-3"));
    }
}
