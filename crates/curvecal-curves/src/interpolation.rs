//! Interpolation methods for yield curves.

use std::sync::Arc;

use curvecal_math::interpolation::{
    FlatForwardInterpolator, Interpolator, LinearInterpolator, LogLinearInterpolator,
    NaturalCubicSpline,
};
use serde::{Deserialize, Serialize};

use crate::error::CurveResult;

/// Interpolation methods for yield curves.
///
/// The method is applied to the curve's node representation (zero rates or
/// discount factors, see [`crate::CurveValueType`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Linear interpolation on node values.
    #[default]
    Linear,

    /// Linear interpolation on log node values. Requires positive values.
    LogLinear,

    /// Natural cubic spline on node values.
    NaturalCubicSpline,

    /// Flat forward rates (linear in `t * value`). Intended for zero-rate nodes.
    FlatForward,
}

impl InterpolationMethod {
    /// Returns true if this method produces C2-smooth curves.
    #[must_use]
    pub fn is_smooth(&self) -> bool {
        matches!(self, Self::NaturalCubicSpline)
    }

    /// Returns true if a node value affects the curve beyond its two neighbouring segments.
    #[must_use]
    pub fn is_local(&self) -> bool {
        !self.is_smooth()
    }

    /// Builds the interpolator for the given nodes.
    pub(crate) fn build(self, xs: Vec<f64>, ys: Vec<f64>) -> CurveResult<Arc<dyn Interpolator>> {
        let interp: Arc<dyn Interpolator> = match self {
            Self::Linear => Arc::new(LinearInterpolator::new(xs, ys)?),
            Self::LogLinear => Arc::new(LogLinearInterpolator::new(xs, ys)?),
            Self::NaturalCubicSpline => Arc::new(NaturalCubicSpline::new(xs, ys)?),
            Self::FlatForward => Arc::new(FlatForwardInterpolator::new(xs, ys)?),
        };
        Ok(interp)
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::LogLinear => "Log-Linear",
            Self::NaturalCubicSpline => "Natural Cubic Spline",
            Self::FlatForward => "Flat Forward",
        };
        write!(f, "{name}")
    }
}
