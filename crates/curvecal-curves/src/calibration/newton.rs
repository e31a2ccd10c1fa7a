//! Newton-Raphson driver for curve calibration.

use curvecal_math::linear_algebra::LuDecomposition;
use curvecal_math::MathError;
use nalgebra::DVector;
use tracing::{debug, info, info_span, warn};

use super::{max_abs, CalibrationProblem, CalibrationResult};
use crate::config::{CalibrationSettings, JacobianMode, Validate};
use crate::error::{CurveError, CurveResult};
use crate::jacobian::{AnalyticJacobian, FiniteDifferenceJacobian, JacobianCalculator};

/// Newton-Raphson curve calibrator.
///
/// Each iteration builds a trial curve from the current node values, prices
/// every instrument (the residuals), and stops when the largest absolute
/// residual is below `tolerance`. Otherwise it solves `J·Δ = -residuals` by LU
/// with partial pivoting and takes the full step. There is no damping or line
/// search.
///
/// A pivot below `pivot_threshold` relative to the largest Jacobian entry
/// aborts with [`CurveError::SingularJacobian`]; running out of iterations
/// aborts with [`CurveError::ConvergenceFailure`] carrying the last iterate.
#[derive(Debug, Clone, Default)]
pub struct CurveCalibrator {
    settings: CalibrationSettings,
}

impl CurveCalibrator {
    /// Creates a calibrator with the given settings.
    #[must_use]
    pub fn new(settings: CalibrationSettings) -> Self {
        Self { settings }
    }

    /// The calibrator settings.
    #[must_use]
    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    /// The Jacobian implementation selected by the settings.
    #[must_use]
    pub fn jacobian_calculator<'a>(
        &self,
        problem: &'a CalibrationProblem,
    ) -> Box<dyn JacobianCalculator + 'a> {
        match self.settings.jacobian {
            JacobianMode::Analytic => {
                Box::new(AnalyticJacobian::new(problem).with_parallel(self.settings.parallel))
            }
            JacobianMode::FiniteDifference => Box::new(
                FiniteDifferenceJacobian::new(problem, self.settings.finite_difference_bump)
                    .with_parallel(self.settings.parallel),
            ),
        }
    }

    /// Calibrates the problem's curve.
    ///
    /// # Errors
    ///
    /// - `Validation` / `MultipleValidationErrors` for invalid settings
    /// - `InvalidValue` if a residual is not finite
    /// - `SingularJacobian` if the Newton system cannot be solved
    /// - `ConvergenceFailure` if `max_iterations` steps do not converge
    pub fn calibrate(&self, problem: &CalibrationProblem) -> CurveResult<CalibrationResult> {
        self.settings.validate_or_error()?;

        let calculator = self.jacobian_calculator(problem);
        let span = info_span!(
            "calibrate",
            nodes = problem.node_count(),
            interpolation = %problem.seed().interpolation(),
            jacobian = calculator.name(),
        );
        let _guard = span.enter();

        let parallel = self.settings.parallel;
        let mut nodes = problem.seed().node_values().to_vec();
        let mut iteration: u32 = 0;

        loop {
            let curve = problem.trial_curve(&nodes)?;
            let residuals = problem.residuals(&curve, parallel)?;
            if let Some(i) = residuals.iter().position(|r| !r.is_finite()) {
                return Err(CurveError::invalid_value(format!(
                    "residual of instrument {i} is {} at iteration {iteration}",
                    residuals[i]
                )));
            }

            let max_residual = max_abs(&residuals);
            debug!(iteration, max_residual, "newton iteration");

            if max_residual < self.settings.tolerance {
                let jacobian = calculator.evaluate(&nodes)?;
                let sensitivities = problem.sensitivities(&curve, parallel)?;
                info!(iterations = iteration, max_residual, "calibration converged");
                return Ok(CalibrationResult {
                    curve,
                    iterations: iteration,
                    residuals,
                    jacobian,
                    sensitivities,
                });
            }

            if iteration >= self.settings.max_iterations {
                warn!(
                    iterations = iteration,
                    max_residual, "calibration did not converge"
                );
                return Err(CurveError::ConvergenceFailure {
                    iterations: iteration,
                    max_residual,
                    node_values: nodes,
                    residuals,
                });
            }

            let jacobian = calculator.evaluate(&nodes)?;
            let lu = LuDecomposition::factor(jacobian.matrix(), self.settings.pivot_threshold)
                .map_err(|err| match err {
                    MathError::SingularMatrix { column, pivot } => {
                        warn!(iteration, column, pivot, "singular jacobian");
                        CurveError::SingularJacobian {
                            iteration,
                            column,
                            pivot,
                        }
                    }
                    other => other.into(),
                })?;
            let rhs = DVector::from_iterator(residuals.len(), residuals.iter().map(|r| -r));
            let step = lu.solve(&rhs)?;

            for (node, delta) in nodes.iter_mut().zip(step.iter()) {
                *node += delta;
            }
            iteration += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveDefinition, YieldCurve};
    use crate::instruments::{CalibratingInstrument, Cash};

    fn deposit_problem(rates: &[f64]) -> CalibrationProblem {
        let times = vec![0.5, 1.0];
        let seed = YieldCurve::new(CurveDefinition::new(times, vec![0.05, 0.05])).unwrap();
        let instruments: Vec<CalibratingInstrument> = vec![
            Cash::new(0.0, 0.5, rates[0], 1.0).into(),
            Cash::new(0.0, 1.0, rates[1], 1.0).into(),
        ];
        CalibrationProblem::new(instruments, seed).unwrap()
    }

    #[test]
    fn test_two_deposits_converge() {
        let result = CurveCalibrator::default()
            .calibrate(&deposit_problem(&[0.03, 0.035]))
            .unwrap();
        let expected_0 = (1.0_f64 + 0.03 * 0.5).ln() / 0.5;
        let expected_1 = (1.0_f64 + 0.035).ln();
        assert!((result.curve.node_values()[0] - expected_0).abs() < 1e-9);
        assert!((result.curve.node_values()[1] - expected_1).abs() < 1e-9);
        assert!(result.max_residual() < 1e-10);
        assert_eq!(result.jacobian.node_count(), 2);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let calibrator = CurveCalibrator::new(CalibrationSettings::default().with_tolerance(-1.0));
        assert!(matches!(
            calibrator.calibrate(&deposit_problem(&[0.03, 0.035])),
            Err(CurveError::Validation { .. })
        ));
    }

    #[test]
    fn test_selects_calculator() {
        let problem = deposit_problem(&[0.03, 0.035]);
        let fd = CurveCalibrator::new(
            CalibrationSettings::default().with_jacobian(JacobianMode::FiniteDifference),
        );
        assert_eq!(fd.jacobian_calculator(&problem).name(), "FiniteDifference");
        assert_eq!(
            CurveCalibrator::default().jacobian_calculator(&problem).name(),
            "Analytic"
        );
    }
}
