//! Benchmarks for curve calibration and Jacobian evaluation.
//!
//! Run with: cargo bench -p curvecal-curves

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use curvecal_curves::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

const TENORS: [f64; 10] = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0];
const RATES: [f64; 10] = [
    0.030, 0.032, 0.035, 0.038, 0.040, 0.042, 0.045, 0.048, 0.050, 0.051,
];

fn truth_curve(method: InterpolationMethod) -> YieldCurve {
    YieldCurve::new(
        CurveDefinition::new(TENORS.to_vec(), RATES.to_vec())
            .with_interpolation(method)
            .with_anchor(0.029),
    )
    .unwrap()
}

fn create_problem(method: InterpolationMethod) -> CalibrationProblem {
    let truth = truth_curve(method);
    let curves = CurveSet::single(&truth);

    let mut templates: Vec<CalibratingInstrument> = vec![Cash::new(0.0, 0.5, 0.0, 1.0).into()];
    for &maturity in &TENORS[1..] {
        templates.push(
            Swap::vanilla(0.0, maturity, Frequency::Annual, Frequency::Quarterly, 0.0, 1.0)
                .unwrap()
                .into(),
        );
    }
    let instruments = templates
        .iter()
        .map(|i| ParRateCalculator.at_par(i, &curves).unwrap())
        .collect();

    CalibrationProblem::new(instruments, truth.with_values(&[0.05; 10]).unwrap()).unwrap()
}

const METHODS: [InterpolationMethod; 4] = [
    InterpolationMethod::Linear,
    InterpolationMethod::LogLinear,
    InterpolationMethod::NaturalCubicSpline,
    InterpolationMethod::FlatForward,
];

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_calibration(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate_10_nodes");
    for method in METHODS {
        let problem = create_problem(method);
        let calibrator = CurveCalibrator::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(method),
            &problem,
            |b, problem| b.iter(|| calibrator.calibrate(black_box(problem)).unwrap()),
        );
    }
    group.finish();
}

fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian_10_nodes");
    let problem = create_problem(InterpolationMethod::NaturalCubicSpline);
    let nodes = problem.seed().node_values().to_vec();

    group.bench_function("analytic", |b| {
        let calc = AnalyticJacobian::new(&problem);
        b.iter(|| calc.evaluate(black_box(&nodes)).unwrap());
    });
    group.bench_function("finite_difference", |b| {
        let calc = FiniteDifferenceJacobian::new(&problem, 1e-6);
        b.iter(|| calc.evaluate(black_box(&nodes)).unwrap());
    });
    group.finish();
}

fn bench_curve_lookup(c: &mut Criterion) {
    let curve = truth_curve(InterpolationMethod::NaturalCubicSpline);
    c.bench_function("discount_factor_sensitivities", |b| {
        b.iter(|| curve.discount_factor_sensitivities(black_box(6.3)).unwrap());
    });
}

// =============================================================================
// CRITERION GROUPS
// =============================================================================

criterion_group!(calibration, bench_calibration, bench_jacobian);
criterion_group!(curve_ops, bench_curve_lookup);

criterion_main!(calibration, curve_ops);
