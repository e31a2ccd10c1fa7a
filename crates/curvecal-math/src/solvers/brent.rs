//! Brent's root-finding algorithm.

use tracing::trace;

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Brent's root-finding algorithm (van Wijngaarden-Dekker-Brent).
///
/// Combines inverse quadratic interpolation and secant steps with a
/// bisection fallback, so it converges superlinearly on smooth functions while
/// never leaving the bracket.
///
/// Requires: `f(a) * f(b) <= 0` (opposite signs at endpoints). If either
/// endpoint already satisfies `|f| < tolerance` it is returned immediately.
///
/// Iteration stops when `|f(x)| < config.tolerance`, or when the bracket has
/// collapsed to machine precision around `x`.
///
/// # Errors
///
/// - [`MathError::InvalidBracket`] if the endpoints do not straddle a root
/// - [`MathError::InvalidInput`] if an endpoint is not finite
/// - [`MathError::ConvergenceFailed`] if `config.max_iterations` is exhausted
///
/// # Example
///
/// ```rust
/// use curvecal_math::solvers::{brent, SolverConfig};
///
/// // Find root of x^3 - x - 2
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!((f(result.root)).abs() < 1e-10);
/// ```
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(MathError::invalid_input(format!(
            "bracket endpoints must be finite: [{a}, {b}]"
        )));
    }

    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa.abs() < config.tolerance {
        return Ok(SolverResult::at(a, 0, fa));
    }
    if fb.abs() < config.tolerance {
        return Ok(SolverResult::at(b, 0, fb));
    }
    if fa * fb > 0.0 || fa.is_nan() || fb.is_nan() {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    // c is the contrapoint: f(b) and f(c) always have opposite signs
    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for iteration in 1..=config.max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + f64::MIN_POSITIVE;
        let xm = 0.5 * (c - b);

        if fb.abs() < config.tolerance || xm.abs() <= tol1 || fb == 0.0 {
            trace!(iteration, root = b, residual = fb, "brent converged");
            return Ok(SolverResult::at(b, iteration, fb));
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 {
            d
        } else {
            tol1.copysign(xm)
        };
        fb = f(b);
    }

    Err(MathError::convergence_failed(config.max_iterations, fb.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sqrt_2() {
        let f = |x: f64| x * x - 2.0;

        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_cubic() {
        // x^3 - x - 2 has a root near 1.52
        let f = |x: f64| x * x * x - x - 2.0;

        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();

        assert!(f(result.root).abs() < 1e-10);
        assert_relative_eq!(result.root, 1.521_379_706_804_568, epsilon = 1e-10);
    }

    #[test]
    fn test_sin() {
        let f = |x: f64| x.sin();

        let result = brent(f, 3.0, 4.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::PI, epsilon = 1e-10);
    }

    #[test]
    fn test_reversed_bracket() {
        let f = |x: f64| x * x - 2.0;

        let result = brent(f, 2.0, 1.0, &SolverConfig::default()).unwrap();

        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_bracket() {
        let f = |x: f64| x * x - 2.0;

        let result = brent(f, 2.0, 3.0, &SolverConfig::default());

        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_root_at_endpoint() {
        let f = |x: f64| x - 1.0;

        let result = brent(f, 1.0, 5.0, &SolverConfig::default()).unwrap();

        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 0);

        let result = brent(f, -3.0, 1.0, &SolverConfig::default()).unwrap();
        assert_eq!(result.root, 1.0);
    }

    #[test]
    fn test_iteration_cap() {
        let f = |x: f64| x.powi(3) - 0.5;
        let config = SolverConfig::new(1e-15, 2);

        let result = brent(f, -10.0, 10.0, &config);

        assert!(matches!(
            result,
            Err(MathError::ConvergenceFailed { iterations: 2, .. })
        ));
    }

    #[test]
    fn test_faster_than_bisection() {
        let f = |x: f64| x * x - 2.0;

        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();

        // Bisection needs ~34 iterations for 1e-10
        assert!(result.iterations < 20);
    }

    proptest! {
        #[test]
        fn prop_monotonic_root_found_inside_bracket(
            root in -2.5f64..2.5,
            lo_gap in 0.01f64..0.5,
            hi_gap in 0.01f64..0.5,
        ) {
            let f = |x: f64| x.exp() - root.exp();
            let lo = root - lo_gap;
            let hi = root + hi_gap;

            let result = brent(f, lo, hi, &SolverConfig::default()).unwrap();

            prop_assert!(f(result.root).abs() < 1e-10);
            prop_assert!(result.root >= lo && result.root <= hi);
        }

        #[test]
        fn prop_convex_decreasing_root(
            rate in 0.001f64..0.2,
            maturity in 0.5f64..30.0,
        ) {
            // Discount factor inversion: convex and decreasing in the rate
            let target = (-rate * maturity).exp();
            let f = |r: f64| (-r * maturity).exp() - target;

            let result = brent(f, -0.1, 0.5, &SolverConfig::default()).unwrap();

            prop_assert!(f(result.root).abs() < 1e-10);
            prop_assert!((-0.1..=0.5).contains(&result.root));
        }
    }
}
