//! Curve calibration.
//!
//! A [`CalibrationProblem`] fixes the calibrating instruments (rows), the
//! curve layout with its seed values (columns) and, optionally, an exogenous
//! funding curve. [`CurveCalibrator`] then drives a Newton iteration on the
//! free node values until every instrument reprices to zero PV.
//!
//! # Single-curve and two-curve problems
//!
//! Without a funding curve the calibrated curve plays both roles, and both the
//! forward and the funding sensitivity pairs of each instrument feed the
//! Jacobian. With [`CalibrationProblem::with_funding_curve`] the calibrated
//! curve is the forward curve only and discounting uses the fixed curve.

mod newton;

pub use newton::CurveCalibrator;

use serde::Serialize;

use crate::curve::YieldCurve;
use crate::curve_set::CurveSet;
use crate::error::{CurveError, CurveResult};
use crate::instruments::CalibratingInstrument;
use crate::jacobian::Jacobian;
use crate::parallel::maybe_parallel_try_map;
use crate::pricing::{InstrumentSensitivities, PresentValueCalculator, SensitivityPair};

/// Instruments, curve layout and seed for one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationProblem {
    instruments: Vec<CalibratingInstrument>,
    seed: YieldCurve,
    funding_curve: Option<YieldCurve>,
}

impl CalibrationProblem {
    /// Creates a single-curve problem.
    ///
    /// # Errors
    ///
    /// Returns an error if the instrument count differs from the node count,
    /// any instrument is invalid, or a node time is not positive.
    pub fn new(instruments: Vec<CalibratingInstrument>, seed: YieldCurve) -> CurveResult<Self> {
        if instruments.len() != seed.node_count() {
            return Err(CurveError::invalid_input(format!(
                "calibration needs one instrument per node: {} instruments, {} nodes",
                instruments.len(),
                seed.node_count()
            )));
        }
        if seed.node_times()[0] <= 0.0 {
            return Err(CurveError::invalid_input(
                "calibrated node times must be positive",
            ));
        }
        for (i, instrument) in instruments.iter().enumerate() {
            instrument.validate().map_err(|err| {
                CurveError::invalid_input(format!("instrument {i} ({}): {err}", instrument.kind()))
            })?;
        }
        Ok(Self {
            instruments,
            seed,
            funding_curve: None,
        })
    }

    /// Discounts with a fixed curve and calibrates the forward curve only.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first instrument whose PV does not depend
    /// on the forward curve; its Jacobian row would be identically zero.
    pub fn with_funding_curve(mut self, funding: YieldCurve) -> CurveResult<Self> {
        if let Some((i, instrument)) = self
            .instruments
            .iter()
            .enumerate()
            .find(|(_, instrument)| !instrument.depends_on_forward_curve())
        {
            return Err(CurveError::invalid_input(format!(
                "instrument {i} ({}) is priced on the funding curve only and cannot \
                 calibrate a forward curve",
                instrument.kind()
            )));
        }
        self.funding_curve = Some(funding);
        Ok(self)
    }

    /// Calibrating instruments in row order.
    #[must_use]
    pub fn instruments(&self) -> &[CalibratingInstrument] {
        &self.instruments
    }

    /// Seed curve; its layout is shared by every trial curve.
    #[must_use]
    pub fn seed(&self) -> &YieldCurve {
        &self.seed
    }

    /// Exogenous funding curve, if any.
    #[must_use]
    pub fn funding_curve(&self) -> Option<&YieldCurve> {
        self.funding_curve.as_ref()
    }

    /// Number of unknowns.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.seed.node_count()
    }

    /// Curve with the seed layout and the given node values.
    pub fn trial_curve(&self, node_values: &[f64]) -> CurveResult<YieldCurve> {
        self.seed.with_values(node_values)
    }

    /// Curves to price against when `trial` is the calibrated curve.
    #[must_use]
    pub fn curve_set<'a>(&'a self, trial: &'a YieldCurve) -> CurveSet<'a> {
        match &self.funding_curve {
            Some(funding) => CurveSet::new(funding, trial),
            None => CurveSet::single(trial),
        }
    }

    /// Instrument PVs on the trial curve, in row order.
    pub fn residuals(&self, trial: &YieldCurve, parallel: bool) -> CurveResult<Vec<f64>> {
        let curves = self.curve_set(trial);
        maybe_parallel_try_map(&self.instruments, parallel, |instrument| {
            PresentValueCalculator.present_value(instrument, &curves)
        })
    }

    /// Forward and funding sensitivity pairs of every instrument, in row order.
    pub fn sensitivities(
        &self,
        trial: &YieldCurve,
        parallel: bool,
    ) -> CurveResult<Vec<InstrumentSensitivities>> {
        let curves = self.curve_set(trial);
        maybe_parallel_try_map(&self.instruments, parallel, |instrument| {
            InstrumentSensitivities::calculate(instrument, &curves)
        })
    }

    /// The pairs that load on the calibrated curve.
    pub(crate) fn calibrated_pairs<'s>(
        &self,
        sensitivities: &'s InstrumentSensitivities,
    ) -> Box<dyn Iterator<Item = &'s SensitivityPair> + 's> {
        if self.funding_curve.is_some() {
            Box::new(sensitivities.forward.iter())
        } else {
            Box::new(sensitivities.all())
        }
    }
}

/// Outcome of a converged calibration.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationResult {
    /// The calibrated curve.
    pub curve: YieldCurve,
    /// Newton steps taken.
    pub iterations: u32,
    /// Instrument PVs on the calibrated curve.
    pub residuals: Vec<f64>,
    /// Jacobian at the solution.
    pub jacobian: Jacobian,
    /// Sensitivity pairs of every instrument at the solution.
    pub sensitivities: Vec<InstrumentSensitivities>,
}

impl CalibrationResult {
    /// Largest absolute residual.
    #[must_use]
    pub fn max_residual(&self) -> f64 {
        max_abs(&self.residuals)
    }
}

pub(crate) fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
