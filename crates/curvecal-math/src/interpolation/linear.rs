//! Linear interpolation.

use super::{check_range, find_segment, validate_nodes, Interpolator};
use crate::error::MathResult;

/// Piecewise linear interpolation between adjacent nodes.
///
/// ```rust
/// use curvecal_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 4.0]).unwrap();
/// assert!((interp.interpolate(1.5).unwrap() - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are provided, lengths differ,
    /// values are not finite, or x values are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        Ok(Self { xs, ys })
    }

    /// Segment index and weight on the right node.
    fn locate(&self, x: f64) -> (usize, f64) {
        let i = find_segment(&self.xs, x);
        let w = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        (i, w)
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, w) = self.locate(x);
        Ok((1.0 - w) * self.ys[i] + w * self.ys[i + 1])
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let i = find_segment(&self.xs, x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn node_sensitivities(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, w) = self.locate(x);
        let mut sens = vec![0.0; self.ys.len()];
        sens[i] = 1.0 - w;
        sens[i + 1] = w;
        Ok(sens)
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn name(&self) -> &'static str {
        "Linear"
    }
}
