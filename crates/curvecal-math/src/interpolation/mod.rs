//! Interpolation with analytic node sensitivities.
//!
//! Every interpolator in this module is built once from a set of nodes and is
//! then immutable: the built value *is* the prepared data bundle (segment
//! lookup, cached logarithms, spline coefficient sensitivities). A calibration
//! step that changes node values builds a new interpolator.
//!
//! Besides the interpolated value and its slope, each interpolator reports
//! [`Interpolator::node_sensitivities`], the vector of partial derivatives of
//! the interpolated value with respect to every node value. These come from
//! the interpolation basis itself, so a Jacobian built from them is exact up to
//! rounding and costs one pass per query point.
//!
//! # Available Methods
//!
//! | Method | Continuity | Sensitivity support |
//! |--------|------------|---------------------|
//! | [`LinearInterpolator`] | C0 | two neighbouring nodes |
//! | [`LogLinearInterpolator`] | C0 | two neighbouring nodes |
//! | [`FlatForwardInterpolator`] | C0 | two neighbouring nodes |
//! | [`NaturalCubicSpline`] | C2 | every node |

mod cubic_spline;
mod flat_forward;
mod linear;
mod log_linear;

pub use cubic_spline::NaturalCubicSpline;
pub use flat_forward::FlatForwardInterpolator;
pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use std::fmt::Debug;

use crate::error::{MathError, MathResult};

/// Trait for one-dimensional interpolators over sorted nodes.
pub trait Interpolator: Send + Sync + Debug {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative with respect to x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns `∂interpolate(x)/∂ys[k]` for every node `k`.
    ///
    /// The returned vector always has one entry per node.
    fn node_sensitivities(&self, x: f64) -> MathResult<Vec<f64>>;

    /// Node abscissae, strictly increasing.
    fn xs(&self) -> &[f64];

    /// Node values.
    fn ys(&self) -> &[f64];

    /// Short name of the scheme.
    fn name(&self) -> &'static str;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64 {
        self.xs()[0]
    }

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64 {
        let xs = self.xs();
        xs[xs.len() - 1]
    }

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Checks lengths, finiteness and strict ordering of node data.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if let Some(i) = xs
        .iter()
        .chain(ys.iter())
        .position(|v| !v.is_finite())
    {
        return Err(MathError::invalid_input(format!(
            "node data must be finite (entry {i})"
        )));
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(MathError::invalid_input(
                "x values must be strictly increasing",
            ));
        }
    }
    Ok(())
}

/// Finds the index i such that xs[i] <= x <= xs[i+1], clamped to a valid segment.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&probe| probe <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Rejects query points outside the node range.
pub(crate) fn check_range(xs: &[f64], x: f64) -> MathResult<()> {
    let min = xs[0];
    let max = xs[xs.len() - 1];
    if x < min || x > max || x.is_nan() {
        return Err(MathError::ExtrapolationNotAllowed { x, min, max });
    }
    Ok(())
}
