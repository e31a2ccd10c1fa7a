//! CLI error types.

use curvecal_curves::CurveError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Invalid coupon rate.
    #[error("Invalid coupon rate: {0}. Must be between 0 and 100.")]
    InvalidCoupon(f64),

    /// Invalid price.
    #[error("Invalid price: {0}. Must be positive.")]
    InvalidPrice(f64),

    /// Missing required argument.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Calibration or pricing error.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
