//! Implied flat rate of a single instrument.

use tracing::debug;

use super::PresentValueCalculator;
use crate::config::RootFinderSettings;
use crate::curve::YieldCurve;
use crate::curve_set::CurveSet;
use crate::error::CurveResult;
use crate::instruments::CalibratingInstrument;

/// The flat continuously compounded zero rate at which the instrument has zero PV.
///
/// Brackets from `settings.initial_bracket`, then solves with Brent.
///
/// # Errors
///
/// Returns an error if the instrument is invalid, no bracket is found, or the
/// solver does not converge.
pub fn implied_flat_rate(
    instrument: &CalibratingInstrument,
    settings: &RootFinderSettings,
) -> CurveResult<f64> {
    instrument.validate()?;
    let objective = |rate: f64| {
        // A validated instrument prices on any finite flat curve; NaN marks the rest.
        YieldCurve::flat(rate)
            .and_then(|curve| {
                PresentValueCalculator.present_value(instrument, &CurveSet::single(&curve))
            })
            .unwrap_or(f64::NAN)
    };
    let rate = settings.solve(objective)?;
    debug!(kind = %instrument.kind(), rate, "implied flat rate");
    Ok(rate)
}
