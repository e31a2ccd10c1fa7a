//! Natural cubic spline interpolation.

use super::{check_range, find_segment, validate_nodes, Interpolator};
use crate::error::MathResult;
use crate::linear_algebra::solve_tridiagonal;

/// Natural cubic spline (zero second derivative at both ends).
///
/// The second derivatives `M` solve a tridiagonal system whose right-hand side
/// is linear in the node values, so `M = S * y` for a fixed matrix `S` that
/// depends only on the abscissae. `S` is built at construction by solving the
/// system once per unit node vector, which gives exact node sensitivities.
///
/// With two nodes the spline degenerates to a straight line.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each node.
    m: Vec<f64>,
    /// `dm_dy[j][k] = ∂M_j / ∂y_k`.
    dm_dy: Vec<Vec<f64>>,
}

impl NaturalCubicSpline {
    /// Creates a new natural cubic spline.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 2 points are provided or the node data is invalid.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys, 2)?;
        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        let mut dm_dy = vec![vec![0.0; n]; n];
        if n > 2 {
            let interior = n - 2;
            let sub: Vec<f64> = (1..interior).map(|r| h[r]).collect();
            let diag: Vec<f64> = (0..interior).map(|r| 2.0 * (h[r] + h[r + 1])).collect();
            let sup: Vec<f64> = (0..interior - 1).map(|r| h[r + 1]).collect();

            for k in 0..n {
                // Right-hand side of the interior equations for y = e_k.
                let rhs: Vec<f64> = (0..interior)
                    .map(|r| {
                        let i = r + 1;
                        let mut v = 0.0;
                        if k == i - 1 {
                            v += 6.0 / h[i - 1];
                        }
                        if k == i {
                            v -= 6.0 / h[i - 1] + 6.0 / h[i];
                        }
                        if k == i + 1 {
                            v += 6.0 / h[i];
                        }
                        v
                    })
                    .collect();
                if rhs.iter().all(|v| *v == 0.0) {
                    continue;
                }
                let column = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;
                for (r, value) in column.into_iter().enumerate() {
                    dm_dy[r + 1][k] = value;
                }
            }
        }

        let m = dm_dy
            .iter()
            .map(|row| row.iter().zip(ys.iter()).map(|(s, y)| s * y).sum())
            .collect();

        Ok(Self { xs, ys, m, dm_dy })
    }

    /// Second derivatives at the nodes.
    #[must_use]
    pub fn second_derivatives(&self) -> &[f64] {
        &self.m
    }

    fn basis(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for NaturalCubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.basis(x);
        let curvature = ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0;
        Ok(a * self.ys[i] + b * self.ys[i + 1] + curvature)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.basis(x);
        Ok((self.ys[i + 1] - self.ys[i]) / h - (3.0 * a * a - 1.0) * h * self.m[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.m[i + 1] / 6.0)
    }

    fn node_sensitivities(&self, x: f64) -> MathResult<Vec<f64>> {
        check_range(&self.xs, x)?;
        let (i, h, a, b) = self.basis(x);
        let ca = (a * a * a - a) * h * h / 6.0;
        let cb = (b * b * b - b) * h * h / 6.0;

        let mut sens: Vec<f64> = self.dm_dy[i]
            .iter()
            .zip(self.dm_dy[i + 1].iter())
            .map(|(dl, dr)| ca * dl + cb * dr)
            .collect();
        sens[i] += a;
        sens[i + 1] += b;
        Ok(sens)
    }

    fn xs(&self) -> &[f64] {
        &self.xs
    }

    fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn name(&self) -> &'static str {
        "NaturalCubicSpline"
    }
}
