//! Log-linear interpolation.

use super::{check_range, find_segment, validate_nodes, Interpolator};
use crate::error::{MathError, MathResult};

/// Linear interpolation of `ln(y)`, the usual choice for discount factors.
///
/// Piecewise constant forward rates follow when the nodes are discount factors.
/// All node values must be strictly positive.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if the node data is invalid or any y value is not positive.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        if ys.iter().any(|&y| y <= 0.0) {
            return Err(MathError::invalid_input(
                "log-linear interpolation requires positive y values",
            ));
        }
        let log_ys = ys.iter().map(|y| y.ln()).collect();
        Ok(Self { xs, ys, log_ys })
    }

    fn locate(&self, x: f64) -> (usize, f64) {
        let i = find_segment(&self.xs, x);
        let w = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        (i, w)
    }

    fn value_on_segment(&self, i: usize, w: f64) -> f64 {
        ((1.0 - w) * self.log_ys[i] + w * self.log_ys[i + 1]).exp()
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, w) = self.locate(x);
        Ok(self.value_on_segment(i, w))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, w) = self.locate(x);
        let slope = (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i]);
        Ok(self.value_on_segment(i, w) * slope)
    }

    fn node_sensitivities(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, w) = self.locate(x);
        let value = self.value_on_segment(i, w);
        let mut sens = vec![0.0; self.ys.len()];
        sens[i] = value * (1.0 - w) / self.ys[i];
        sens[i + 1] = value * w / self.ys[i + 1];
        Ok(sens)
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn name(&self) -> &'static str {
        "LogLinear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factors_give_constant_forward() {
        let r: f64 = 0.04;
        let xs = vec![0.0, 1.0, 2.0];
        let ys: Vec<f64> = xs.iter().map(|t: &f64| (-r * t).exp()).collect();
        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        let df = interp.interpolate(1.3).unwrap();
        assert_relative_eq!(df, (-r * 1.3).exp(), epsilon = 1e-12);
        assert_relative_eq!(interp.derivative(1.3).unwrap() / df, -r, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![-1.0, 0.5]).is_err());
    }

    #[test]
    fn test_sensitivity_at_node() {
        let interp = LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.95]).unwrap();
        let sens = interp.node_sensitivities(0.0).unwrap();
        assert_relative_eq!(sens[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(sens[1], 0.0, epsilon = 1e-12);
    }
}
