//! Flat forward interpolation on zero rates.

use super::{check_range, find_segment, validate_nodes, Interpolator};
use crate::error::{MathError, MathResult};

/// Flat forward interpolation for continuously compounded zero rates.
///
/// Between nodes the instantaneous forward rate is constant, which makes
/// `r(t) * t` linear in `t`:
///
/// ```text
/// r(t) = ((1 - w) * r_i * t_i + w * r_{i+1} * t_{i+1}) / t,   w = (t - t_i) / (t_{i+1} - t_i)
/// ```
///
/// The first node may sit at `t = 0`; the value there is the node value itself
/// and the first segment carries the first non-zero node's rate.
#[derive(Debug, Clone)]
pub struct FlatForwardInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl FlatForwardInterpolator {
    /// Creates a new flat forward interpolator from tenors and zero rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the node data is invalid or any tenor is negative.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        if xs[0] < 0.0 {
            return Err(MathError::invalid_input(
                "flat forward interpolation requires non-negative tenors",
            ));
        }
        Ok(Self { xs, ys })
    }

    /// Forward rate on segment i.
    fn forward(&self, i: usize) -> f64 {
        (self.ys[i + 1] * self.xs[i + 1] - self.ys[i] * self.xs[i]) / (self.xs[i + 1] - self.xs[i])
    }

    fn locate(&self, x: f64) -> (usize, f64) {
        let i = find_segment(&self.xs, x);
        let w = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        (i, w)
    }
}

impl Interpolator for FlatForwardInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        if x <= 0.0 {
            return Ok(self.ys[0]);
        }
        let (i, w) = self.locate(x);
        let rt = (1.0 - w) * self.ys[i] * self.xs[i] + w * self.ys[i + 1] * self.xs[i + 1];
        Ok(rt / x)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        if x <= 0.0 {
            return Ok(0.0);
        }
        let i = find_segment(&self.xs, x);
        let f = self.forward(i);
        let intercept = self.ys[i] * self.xs[i] - f * self.xs[i];
        Ok(-intercept / (x * x))
    }

    fn node_sensitivities(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let mut sens = vec![0.0; self.ys.len()];
        if x <= 0.0 {
            sens[0] = 1.0;
            return Ok(sens);
        }
        let (i, w) = self.locate(x);
        sens[i] = (1.0 - w) * self.xs[i] / x;
        sens[i + 1] = w * self.xs[i + 1] / x;
        Ok(sens)
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn name(&self) -> &'static str {
        "FlatForward"
    }
}
