//! Dense and tridiagonal linear solvers.
//!
//! The Newton calibrator solves one small dense system per iteration, so the
//! dense path is a plain LU factorization with partial pivoting on nalgebra
//! matrices. Singularity is judged against a pivot threshold relative to the
//! largest absolute entry of the matrix, which keeps the test independent of
//! notional scaling.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Default relative pivot threshold.
pub const DEFAULT_PIVOT_THRESHOLD: f64 = 1e-12;

/// Solves a tridiagonal system of equations efficiently.
///
/// The system has the form:
/// ```text
/// | b[0]  c[0]   0    ...   0   | | x[0]   |   | d[0]   |
/// | a[0]  b[1]  c[1]  ...   0   | | x[1]   |   | d[1]   |
/// |  0    a[1]  b[2]  ...   0   | | x[2]   | = | d[2]   |
/// | ...   ...   ...   ...  ...  | | ...    |   | ...    |
/// |  0     0     0   a[n-2] b[n-1] | | x[n-1] |   | d[n-1] |
/// ```
///
/// # Arguments
///
/// * `a` - Lower diagonal (length n-1)
/// * `b` - Main diagonal (length n)
/// * `c` - Upper diagonal (length n-1)
/// * `d` - Right-hand side (length n)
///
/// # Errors
///
/// Returns `InvalidInput` on inconsistent lengths and `SingularMatrix` on a
/// vanishing pivot.
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> MathResult<Vec<f64>> {
    let n = b.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if a.len() != n - 1 || c.len() != n - 1 || d.len() != n {
        return Err(MathError::invalid_input(
            "Tridiagonal system has inconsistent dimensions",
        ));
    }
    if b[0].abs() < f64::MIN_POSITIVE {
        return Err(MathError::singular_matrix(0, b[0]));
    }

    // Forward elimination
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    if n > 1 {
        c_prime[0] = c[0] / b[0];
    }
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let denom = b[i] - a[i - 1] * c_prime[i - 1];
        if denom.abs() < 1e-15 {
            return Err(MathError::singular_matrix(i, denom));
        }
        if i < n - 1 {
            c_prime[i] = c[i] / denom;
        }
        d_prime[i] = (d[i] - a[i - 1] * d_prime[i - 1]) / denom;
    }

    // Back substitution
    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}

/// LU factorization `P·A = L·U` with partial (row) pivoting.
///
/// L (unit diagonal) and U are stored packed in one matrix.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: DMatrix<f64>,
    permutation: Vec<usize>,
    swaps: usize,
}

impl LuDecomposition {
    /// Factorizes a square matrix.
    ///
    /// A pivot whose magnitude falls below `pivot_threshold` times the largest
    /// absolute entry of `matrix` is reported as singular, with the column at
    /// which elimination stopped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-square, empty or non-finite matrices and
    /// `SingularMatrix` for a pivot below threshold.
    pub fn factor(matrix: &DMatrix<f64>, pivot_threshold: f64) -> MathResult<Self> {
        let n = matrix.nrows();
        if n != matrix.ncols() {
            return Err(MathError::invalid_input(
                "Matrix must be square for LU decomposition",
            ));
        }
        if n == 0 {
            return Err(MathError::invalid_input("Matrix must not be empty"));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(MathError::invalid_input("Matrix entries must be finite"));
        }

        let scale = matrix.amax();
        let threshold = pivot_threshold * scale;
        let mut lu = matrix.clone();
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut swaps = 0;

        for k in 0..n {
            let (offset, pivot) = lu
                .view((k, k), (n - k, 1))
                .iter()
                .enumerate()
                .fold((0, 0.0_f64), |best, (i, v)| {
                    if v.abs() > best.1.abs() {
                        (i, *v)
                    } else {
                        best
                    }
                });
            if scale == 0.0 || pivot.abs() <= threshold {
                return Err(MathError::singular_matrix(k, pivot));
            }

            let p = k + offset;
            if p != k {
                lu.swap_rows(k, p);
                permutation.swap(k, p);
                swaps += 1;
            }

            for i in k + 1..n {
                let factor = lu[(i, k)] / pivot;
                lu[(i, k)] = factor;
                for j in k + 1..n {
                    lu[(i, j)] -= factor * lu[(k, j)];
                }
            }
        }

        Ok(Self {
            lu,
            permutation,
            swaps,
        })
    }

    /// Dimension of the factorized matrix.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Solves `A·x = b` with the stored factors.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `b` has the wrong length.
    pub fn solve(&self, b: &DVector<f64>) -> MathResult<DVector<f64>> {
        let n = self.dim();
        if b.len() != n {
            return Err(MathError::DimensionMismatch {
                rows1: n,
                cols1: n,
                rows2: b.len(),
                cols2: 1,
            });
        }

        // Forward substitution on the permuted right-hand side
        let mut y = DVector::zeros(n);
        for i in 0..n {
            let mut sum = b[self.permutation[i]];
            for j in 0..i {
                sum -= self.lu[(i, j)] * y[j];
            }
            y[i] = sum;
        }

        // Back substitution
        let mut x = DVector::zeros(n);
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in i + 1..n {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / self.lu[(i, i)];
        }

        Ok(x)
    }

    /// Determinant of the factorized matrix.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let diag: f64 = self.lu.diagonal().iter().product();
        if self.swaps % 2 == 0 {
            diag
        } else {
            -diag
        }
    }
}

/// Solves a linear system Ax = b using LU decomposition with partial pivoting.
///
/// # Errors
///
/// See [`LuDecomposition::factor`] and [`LuDecomposition::solve`].
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    LuDecomposition::factor(a, DEFAULT_PIVOT_THRESHOLD)?.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tridiagonal_simple() {
        let a = vec![1.0, 1.0];
        let b = vec![2.0, 2.0, 2.0];
        let c = vec![1.0, 1.0];
        let d = vec![1.0, 2.0, 3.0];

        let x = solve_tridiagonal(&a, &b, &c, &d).unwrap();

        assert_relative_eq!(b[0] * x[0] + c[0] * x[1], d[0], epsilon = 1e-10);
        assert_relative_eq!(
            a[0] * x[0] + b[1] * x[1] + c[1] * x[2],
            d[1],
            epsilon = 1e-10
        );
        assert_relative_eq!(a[1] * x[1] + b[2] * x[2], d[2], epsilon = 1e-10);
    }

    #[test]
    fn test_tridiagonal_single_equation() {
        let x = solve_tridiagonal(&[], &[4.0], &[], &[-12.0]).unwrap();
        assert_relative_eq!(x[0], -3.0);
        assert!(solve_tridiagonal(&[], &[], &[], &[]).unwrap().is_empty());
        assert!(solve_tridiagonal(&[1.0], &[1.0], &[], &[1.0]).is_err());
    }

    #[test]
    fn test_solve_linear_system() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 5.0]);

        let x = solve_linear_system(&a, &b).unwrap();

        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pivoting_handles_zero_leading_entry() {
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 2.0, 1.0, 0.0, 3.0, 4.0, -3.0, 8.0]);
        let expected = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let b = &a * &expected;

        let lu = LuDecomposition::factor(&a, DEFAULT_PIVOT_THRESHOLD).unwrap();
        let x = lu.solve(&b).unwrap();
        for i in 0..3 {
            assert_relative_eq!(x[i], expected[i], epsilon = 1e-12);
        }
        assert_relative_eq!(lu.determinant(), a.determinant(), epsilon = 1e-10);
    }

    #[test]
    fn test_singular_reports_column() {
        // Second row is a multiple of the first
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
        match LuDecomposition::factor(&a, DEFAULT_PIVOT_THRESHOLD) {
            Err(MathError::SingularMatrix { column, .. }) => assert_eq!(column, 2),
            other => panic!("expected singular matrix, got {other:?}"),
        }
    }

    #[test]
    fn test_threshold_is_relative() {
        let scale = 1e8;
        let a = DMatrix::from_row_slice(2, 2, &[2.0 * scale, 1.0 * scale, 1.0 * scale, 3.0 * scale]);
        let b = DVector::from_vec(vec![5.0 * scale, 5.0 * scale]);
        let x = solve_linear_system(&a, &b).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);

        let tiny = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-14]);
        assert!(LuDecomposition::factor(&tiny, 1e-12).is_err());
    }

    #[test]
    fn test_dimension_checks() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(solve_linear_system(&a, &DVector::from_vec(vec![1.0, 1.0])).is_err());

        let sq = DMatrix::<f64>::identity(2, 2);
        assert!(matches!(
            solve_linear_system(&sq, &DVector::from_vec(vec![1.0])),
            Err(MathError::DimensionMismatch { .. })
        ));
    }
}
