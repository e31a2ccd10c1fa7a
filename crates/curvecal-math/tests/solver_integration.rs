//! Integration tests: bracket-then-solve pipelines and interpolation weights.

use approx::assert_relative_eq;
use curvecal_math::prelude::*;

fn pipeline<S: SingleRootFinder>(solver: &S, f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> MathResult<f64> {
    let (lo, hi) = BracketRoot::new(1.6, 50).bracket(&f, lo, hi)?;
    Ok(solver.find_root(&f, lo, hi)?.root)
}

#[test]
fn test_bracket_expands_to_remote_root() {
    let f = |x: f64| x - 50.0;
    let brent = BrentSolver::new(SolverConfig::new(1e-12, 100));
    let bisection = BisectionSolver::new(SolverConfig::new(1e-10, 200));

    assert_relative_eq!(pipeline(&brent, f, 0.0, 1.0).unwrap(), 50.0, epsilon = 1e-10);
    assert_relative_eq!(pipeline(&bisection, f, 0.0, 1.0).unwrap(), 50.0, epsilon = 1e-8);
}

#[test]
fn test_sign_definite_function_fails_to_bracket() {
    let f = |x: f64| x * x + 1.0;
    let brent = BrentSolver::new(SolverConfig::default());
    match pipeline(&brent, f, 0.0, 1.0) {
        Err(MathError::BracketingFailed { attempts, .. }) => assert_eq!(attempts, 50),
        other => panic!("expected BracketingFailed, got {other:?}"),
    }
}

#[test]
fn test_solvers_agree_on_discount_equation() {
    // Continuously compounded rate whose 5Y discount factor is 0.8.
    let f = |r: f64| (-5.0 * r).exp() - 0.8;
    let expected = -(0.8_f64.ln()) / 5.0;

    let brent = BrentSolver::new(SolverConfig::new(1e-14, 100));
    let bisection = BisectionSolver::new(SolverConfig::new(1e-12, 200));
    assert_relative_eq!(pipeline(&brent, f, 0.0, 0.1).unwrap(), expected, epsilon = 1e-12);
    assert_relative_eq!(pipeline(&bisection, f, 0.0, 0.1).unwrap(), expected, epsilon = 1e-10);
}

#[test]
fn test_affine_interpolators_weights_sum_to_one() {
    let xs = vec![0.5, 1.0, 2.0, 5.0, 10.0];
    let ys = vec![0.02, 0.024, 0.027, 0.031, 0.033];
    let interpolators: Vec<Box<dyn Interpolator>> = vec![
        Box::new(LinearInterpolator::new(xs.clone(), ys.clone()).unwrap()),
        Box::new(NaturalCubicSpline::new(xs.clone(), ys.clone()).unwrap()),
        Box::new(FlatForwardInterpolator::new(xs.clone(), ys.clone()).unwrap()),
    ];

    for interp in &interpolators {
        for x in [0.5, 0.7, 1.5, 3.3, 7.0, 10.0] {
            let weights = interp.node_sensitivities(x).unwrap();
            let total: f64 = weights.iter().sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);

            let value: f64 = weights.iter().zip(&ys).map(|(w, y)| w * y).sum();
            assert_relative_eq!(value, interp.interpolate(x).unwrap(), epsilon = 1e-14);
        }
    }
}

#[test]
fn test_extrapolated_weights_follow_policy() {
    let interp = LinearInterpolator::new(vec![1.0, 2.0, 3.0], vec![0.03, 0.032, 0.035]).unwrap();

    let flat = ExtrapolationMethod::Flat.node_sensitivities(&interp, 5.0).unwrap();
    assert_eq!(flat, vec![0.0, 0.0, 1.0]);

    let linear = ExtrapolationMethod::Linear.node_sensitivities(&interp, 5.0).unwrap();
    assert_relative_eq!(linear[1], -2.0, epsilon = 1e-14);
    assert_relative_eq!(linear[2], 3.0, epsilon = 1e-14);
    assert_relative_eq!(
        ExtrapolationMethod::Linear.value(&interp, 5.0).unwrap(),
        0.041,
        epsilon = 1e-14
    );

    assert!(matches!(
        ExtrapolationMethod::None.value(&interp, 5.0),
        Err(MathError::ExtrapolationNotAllowed { .. })
    ));
}
