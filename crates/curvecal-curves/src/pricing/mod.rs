//! Instrument pricing and sensitivity calculators.
//!
//! Calculators are stateless value objects implementing [`InstrumentVisitor`];
//! [`CalibratingInstrument::accept`] dispatches to the method for the
//! instrument's kind. None of them mutate the instrument, so the calibrator can
//! price the same instruments against a new trial curve every iteration.
//!
//! Sensitivities are reported as [`SensitivityPair`] lists: `(time, weight)`
//! with `weight = ∂PV/∂DF(time)` on one curve role. The Jacobian chains these
//! weights with the curve's discount-factor sensitivities to node values.

mod implied;
mod par_rate;
mod present_value;
mod sensitivity;

pub use implied::implied_flat_rate;
pub use par_rate::ParRateCalculator;
pub use present_value::PresentValueCalculator;
pub use sensitivity::{
    FundingCurveSensitivityCalculator, ForwardCurveSensitivityCalculator,
    InstrumentSensitivities,
};

use serde::{Deserialize, Serialize};

use crate::curve::YieldCurve;
use crate::curve_set::CurveSet;
use crate::error::CurveResult;
use crate::instruments::{Bond, CalibratingInstrument, Cash, Fra, Swap};

/// One term of a PV sensitivity decomposition: `∂PV/∂DF(time) = weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPair {
    /// Time of the discount factor.
    pub time: f64,
    /// Partial derivative of PV with respect to that discount factor.
    pub weight: f64,
}

impl SensitivityPair {
    /// Creates a pair.
    #[must_use]
    pub fn new(time: f64, weight: f64) -> Self {
        Self { time, weight }
    }
}

/// A calculation over every calibrating instrument kind.
pub trait InstrumentVisitor: Send + Sync {
    /// Result of the calculation.
    type Output;

    /// Cash deposit.
    fn visit_cash(&self, cash: &Cash, curves: &CurveSet<'_>) -> CurveResult<Self::Output>;

    /// Forward rate agreement.
    fn visit_fra(&self, fra: &Fra, curves: &CurveSet<'_>) -> CurveResult<Self::Output>;

    /// Interest rate swap.
    fn visit_swap(&self, swap: &Swap, curves: &CurveSet<'_>) -> CurveResult<Self::Output>;

    /// Fixed-coupon bond.
    fn visit_bond(&self, bond: &Bond, curves: &CurveSet<'_>) -> CurveResult<Self::Output>;

    /// Applies the calculation to an instrument.
    fn calculate(
        &self,
        instrument: &CalibratingInstrument,
        curves: &CurveSet<'_>,
    ) -> CurveResult<Self::Output> {
        instrument.accept(self, curves)
    }
}

/// Simple forward rate over `[start, end]` with the discount factors it used.
pub(crate) struct SimpleForward {
    pub rate: f64,
    pub df_start: f64,
    pub df_end: f64,
}

pub(crate) fn simple_forward(
    curve: &YieldCurve,
    start: f64,
    end: f64,
    accrual: f64,
) -> CurveResult<SimpleForward> {
    let df_start = curve.discount_factor(start)?;
    let df_end = curve.discount_factor(end)?;
    Ok(SimpleForward {
        rate: (df_start / df_end - 1.0) / accrual,
        df_start,
        df_end,
    })
}
