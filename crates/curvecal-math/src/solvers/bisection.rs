//! Bisection root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Bisection root-finding algorithm.
///
/// Repeatedly halves the interval and keeps the half across which the
/// function changes sign.
///
/// Requires: `f(a) * f(b) <= 0` (opposite signs at endpoints)
///
/// # Example
///
/// ```rust
/// use curvecal_math::solvers::{bisection, SolverConfig};
///
/// let f = |x: f64| x * x - 2.0;
///
/// let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
pub fn bisection<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(MathError::invalid_input(format!(
            "bracket endpoints must be finite: [{a}, {b}]"
        )));
    }

    let mut lo = a.min(b);
    let mut hi = a.max(b);

    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo.abs() < config.tolerance {
        return Ok(SolverResult::at(lo, 0, f_lo));
    }
    if f_hi.abs() < config.tolerance {
        return Ok(SolverResult::at(hi, 0, f_hi));
    }
    if f_lo * f_hi > 0.0 {
        return Err(MathError::InvalidBracket {
            a: lo,
            b: hi,
            fa: f_lo,
            fb: f_hi,
        });
    }

    let mut f_mid = f_lo;
    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        f_mid = f(mid);

        if f_mid.abs() < config.tolerance || mid <= lo || mid >= hi {
            return Ok(SolverResult::at(mid, iteration, f_mid));
        }

        if f_mid * f_lo < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        f_mid.abs(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;

        let result = bisection(f, 1.0, 2.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_endpoint_root() {
        let f = |x: f64| x - 2.0;

        let result = bisection(f, 2.0, 3.0, &SolverConfig::default()).unwrap();

        assert_eq!(result.root, 2.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x + 1.0;

        assert!(matches!(
            bisection(f, -1.0, 1.0, &SolverConfig::default()),
            Err(MathError::InvalidBracket { .. })
        ));
    }

    #[test]
    fn test_not_enough_iterations() {
        let f = |x: f64| x * x - 2.0;
        let config = SolverConfig::new(1e-14, 5);

        assert!(matches!(
            bisection(f, 1.0, 2.0, &config),
            Err(MathError::ConvergenceFailed { iterations: 5, .. })
        ));
    }
}
