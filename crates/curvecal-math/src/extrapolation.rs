//! Extrapolation policies beyond the node range.
//!
//! An [`ExtrapolationMethod`] wraps any [`Interpolator`]: inside the node range
//! it defers to the interpolator, outside it applies the policy at whichever
//! end the query falls. Policies that continue a trend use the boundary
//! segment (the two outermost nodes on that side), so their node sensitivities
//! are analytic and touch only those two nodes.
//!
//! | Policy | Outside the range | Sensitive nodes |
//! |--------|-------------------|-----------------|
//! | `None` | error | - |
//! | `Flat` | boundary value | boundary node |
//! | `Linear` | boundary segment slope | two boundary nodes |
//! | `LogLinear` | boundary segment slope of `ln(y)` | two boundary nodes |

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Extrapolation policy applied at both ends of an interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExtrapolationMethod {
    /// Queries outside the node range fail.
    None,
    /// Constant value from boundary.
    #[default]
    Flat,
    /// Linear continuation of the boundary segment.
    Linear,
    /// Continuation of the boundary segment in log space. Requires positive values.
    LogLinear,
}

/// Boundary node `b` and its inner neighbour `o` on the side of `x`.
struct Boundary {
    b: usize,
    o: usize,
    /// `(x - x_b) / (x_b - x_o)`, positive when moving away from the range.
    k: f64,
}

impl ExtrapolationMethod {
    /// Returns the value at x, extrapolating if x is outside the node range.
    ///
    /// # Errors
    ///
    /// Returns `ExtrapolationNotAllowed` under [`ExtrapolationMethod::None`] and
    /// `InvalidInput` when log-linear extrapolation meets non-positive values.
    pub fn value(self, interp: &dyn Interpolator, x: f64) -> MathResult<f64> {
        if interp.in_range(x) {
            return interp.interpolate(x);
        }
        let ys = interp.ys();
        let edge = self.boundary(interp, x)?;
        match self {
            Self::None => not_allowed(interp, x),
            Self::Flat => Ok(ys[edge.b]),
            Self::Linear => Ok(ys[edge.b] + (ys[edge.b] - ys[edge.o]) * edge.k),
            Self::LogLinear => {
                let (lb, lo) = log_pair(ys[edge.b], ys[edge.o])?;
                Ok((lb + (lb - lo) * edge.k).exp())
            }
        }
    }

    /// Returns the first derivative in x, extrapolating if needed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ExtrapolationMethod::value`].
    pub fn derivative(self, interp: &dyn Interpolator, x: f64) -> MathResult<f64> {
        if interp.in_range(x) {
            return interp.derivative(x);
        }
        let xs = interp.xs();
        let ys = interp.ys();
        let edge = self.boundary(interp, x)?;
        let width = xs[edge.b] - xs[edge.o];
        match self {
            Self::None => not_allowed(interp, x),
            Self::Flat => Ok(0.0),
            Self::Linear => Ok((ys[edge.b] - ys[edge.o]) / width),
            Self::LogLinear => {
                let value = self.value(interp, x)?;
                let (lb, lo) = log_pair(ys[edge.b], ys[edge.o])?;
                Ok(value * (lb - lo) / width)
            }
        }
    }

    /// Returns `∂value(x)/∂ys[k]` for every node, extrapolating if needed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ExtrapolationMethod::value`].
    pub fn node_sensitivities(self, interp: &dyn Interpolator, x: f64) -> MathResult<Vec<f64>> {
        if interp.in_range(x) {
            return interp.node_sensitivities(x);
        }
        let ys = interp.ys();
        let edge = self.boundary(interp, x)?;
        let mut sens = vec![0.0; ys.len()];
        match self {
            Self::None => return not_allowed(interp, x),
            Self::Flat => sens[edge.b] = 1.0,
            Self::Linear => {
                sens[edge.b] = 1.0 + edge.k;
                sens[edge.o] = -edge.k;
            }
            Self::LogLinear => {
                let value = self.value(interp, x)?;
                sens[edge.b] = value * (1.0 + edge.k) / ys[edge.b];
                sens[edge.o] = -value * edge.k / ys[edge.o];
            }
        }
        Ok(sens)
    }

    fn boundary(self, interp: &dyn Interpolator, x: f64) -> MathResult<Boundary> {
        let xs = interp.xs();
        if self == Self::None || x.is_nan() {
            return not_allowed(interp, x);
        }
        let (b, o) = if x < xs[0] {
            (0, 1)
        } else {
            (xs.len() - 1, xs.len() - 2)
        };
        Ok(Boundary {
            b,
            o,
            k: (x - xs[b]) / (xs[b] - xs[o]),
        })
    }
}

fn log_pair(boundary: f64, other: f64) -> MathResult<(f64, f64)> {
    if boundary <= 0.0 || other <= 0.0 {
        return Err(MathError::invalid_input(
            "log-linear extrapolation requires positive values",
        ));
    }
    Ok((boundary.ln(), other.ln()))
}

fn not_allowed<T>(interp: &dyn Interpolator, x: f64) -> MathResult<T> {
    Err(MathError::ExtrapolationNotAllowed {
        x,
        min: interp.min_x(),
        max: interp.max_x(),
    })
}

impl std::fmt::Display for ExtrapolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Flat => "Flat",
            Self::Linear => "Linear",
            Self::LogLinear => "Log-Linear",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::{LinearInterpolator, NaturalCubicSpline};
    use approx::assert_relative_eq;

    fn sample() -> LinearInterpolator {
        LinearInterpolator::new(vec![1.0, 2.0, 4.0], vec![0.90, 0.80, 0.64]).unwrap()
    }

    #[test]
    fn test_none_rejects() {
        let interp = sample();
        assert!(ExtrapolationMethod::None.value(&interp, 5.0).is_err());
        assert!(ExtrapolationMethod::None.node_sensitivities(&interp, 0.5).is_err());
        assert_relative_eq!(
            ExtrapolationMethod::None.value(&interp, 3.0).unwrap(),
            0.72,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_flat() {
        let interp = sample();
        assert_relative_eq!(ExtrapolationMethod::Flat.value(&interp, 10.0).unwrap(), 0.64);
        assert_relative_eq!(ExtrapolationMethod::Flat.value(&interp, 0.0).unwrap(), 0.90);
        assert_eq!(
            ExtrapolationMethod::Flat.node_sensitivities(&interp, 10.0).unwrap(),
            vec![0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_linear_continues_boundary_segment() {
        let interp = sample();
        // slope on [2, 4] is -0.08
        assert_relative_eq!(
            ExtrapolationMethod::Linear.value(&interp, 5.0).unwrap(),
            0.56,
            epsilon = 1e-12
        );
        // slope on [1, 2] is -0.10
        assert_relative_eq!(
            ExtrapolationMethod::Linear.value(&interp, 0.5).unwrap(),
            0.95,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            ExtrapolationMethod::Linear.derivative(&interp, 5.0).unwrap(),
            -0.08,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_log_linear_continues_ratio() {
        let interp = sample();
        // ratio over [2, 4] is 0.8 per 2 years
        assert_relative_eq!(
            ExtrapolationMethod::LogLinear.value(&interp, 6.0).unwrap(),
            0.512,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sensitivities_match_bumps() {
        let xs = vec![0.5, 1.0, 2.0, 3.0];
        let ys = vec![0.97, 0.95, 0.91, 0.87];
        let h = 1e-7;
        for method in [
            ExtrapolationMethod::Flat,
            ExtrapolationMethod::Linear,
            ExtrapolationMethod::LogLinear,
        ] {
            let base = NaturalCubicSpline::new(xs.clone(), ys.clone()).unwrap();
            for x in [0.1, 4.5] {
                let analytic = method.node_sensitivities(&base, x).unwrap();
                for k in 0..ys.len() {
                    let mut up = ys.clone();
                    up[k] += h;
                    let mut down = ys.clone();
                    down[k] -= h;
                    let up = NaturalCubicSpline::new(xs.clone(), up).unwrap();
                    let down = NaturalCubicSpline::new(xs.clone(), down).unwrap();
                    let numerical =
                        (method.value(&up, x).unwrap() - method.value(&down, x).unwrap()) / (2.0 * h);
                    assert!(
                        (analytic[k] - numerical).abs() < 1e-6,
                        "{method} node {k} at x={x}: analytic={}, numerical={numerical}",
                        analytic[k]
                    );
                }
            }
        }
    }
}
