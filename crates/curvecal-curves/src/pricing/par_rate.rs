//! Par quote calculator.

use super::{simple_forward, InstrumentVisitor};
use crate::curve_set::CurveSet;
use crate::error::{CurveError, CurveResult};
use crate::instruments::{Bond, CalibratingInstrument, Cash, Fra, Swap};

/// The market quote at which an instrument has zero present value.
///
/// Returns the cash rate, the FRA strike, the swap fixed rate or the bond
/// dirty price per unit notional. Replacing an instrument's quote with its par
/// quote on a curve makes that curve reprice it exactly, which is how
/// consistent test and demo quotes are generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParRateCalculator;

impl ParRateCalculator {
    /// Par quote of an instrument.
    pub fn par_rate(
        &self,
        instrument: &CalibratingInstrument,
        curves: &CurveSet<'_>,
    ) -> CurveResult<f64> {
        instrument.accept(self, curves)
    }

    /// Copy of the instrument quoted at par on the given curves.
    pub fn at_par(
        &self,
        instrument: &CalibratingInstrument,
        curves: &CurveSet<'_>,
    ) -> CurveResult<CalibratingInstrument> {
        Ok(instrument.with_quote(self.par_rate(instrument, curves)?))
    }
}

impl InstrumentVisitor for ParRateCalculator {
    type Output = f64;

    fn visit_cash(&self, cash: &Cash, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let funding = curves.funding();
        let df_start = funding.discount_factor(cash.start)?;
        let df_end = funding.discount_factor(cash.end)?;
        Ok((df_start / df_end - 1.0) / cash.accrual)
    }

    fn visit_fra(&self, fra: &Fra, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let forward = simple_forward(
            curves.forward(),
            fra.fixing_start,
            fra.fixing_end,
            fra.fixing_accrual,
        )?;
        Ok(forward.rate)
    }

    fn visit_swap(&self, swap: &Swap, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let funding = curves.funding();
        let floating = &swap.floating;

        let mut floating_pv = 0.0;
        for j in 0..floating.len() {
            let forward = simple_forward(
                curves.forward(),
                floating.fixing_starts[j],
                floating.fixing_ends[j],
                floating.fixing_accruals[j],
            )?;
            floating_pv += floating.payment_accruals[j]
                * funding.discount_factor(floating.payment_times[j])?
                * (forward.rate + floating.spread);
        }

        let mut annuity = 0.0;
        for (t, accrual) in swap.fixed.payment_times.iter().zip(swap.fixed.accruals.iter()) {
            annuity += accrual * funding.discount_factor(*t)?;
        }
        if annuity.abs() < f64::MIN_POSITIVE {
            return Err(CurveError::invalid_value("swap fixed leg annuity is zero"));
        }
        Ok(floating_pv / annuity)
    }

    fn visit_bond(&self, bond: &Bond, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let funding = curves.funding();
        let mut value = bond.notional * funding.discount_factor(bond.maturity)?;
        for (t, amount) in bond.coupon_times.iter().zip(bond.coupon_amounts.iter()) {
            value += amount * funding.discount_factor(*t)?;
        }
        Ok(value / bond.notional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveDefinition, YieldCurve};
    use crate::instruments::Frequency;
    use crate::pricing::PresentValueCalculator;
    use approx::assert_relative_eq;

    #[test]
    fn test_par_quotes_zero_pv() {
        let curve = YieldCurve::new(
            CurveDefinition::new(vec![0.5, 1.0, 2.0, 5.0], vec![0.02, 0.025, 0.03, 0.034])
                .with_anchor(0.019),
        )
        .unwrap();
        let curves = CurveSet::single(&curve);

        let instruments: Vec<CalibratingInstrument> = vec![
            Cash::new(0.0, 0.5, 0.0, 1.0).into(),
            Fra::new(0.5, 1.0, 0.0, 1.0).into(),
            Swap::vanilla(0.0, 2.0, Frequency::SemiAnnual, Frequency::Quarterly, 0.0, 1.0)
                .unwrap()
                .with_spread(0.001)
                .into(),
            Bond::fixed_coupon(0.04, 5.0, Frequency::Annual, 100.0, 1.0).unwrap().into(),
        ];

        for instrument in &instruments {
            let at_par = ParRateCalculator.at_par(instrument, &curves).unwrap();
            let pv = PresentValueCalculator.present_value(&at_par, &curves).unwrap();
            assert!(pv.abs() < 1e-12 * instrument.notional(), "{:?}: pv={pv}", instrument.kind());
        }
    }

    #[test]
    fn test_flat_curve_par_swap_rate() {
        let curve = YieldCurve::flat(0.03).unwrap();
        let swap: CalibratingInstrument =
            Swap::vanilla(0.0, 1.0, Frequency::Annual, Frequency::Annual, 0.0, 1.0)
                .unwrap()
                .into();
        let par = ParRateCalculator
            .par_rate(&swap, &CurveSet::single(&curve))
            .unwrap();
        // One annual period: par rate equals the simple forward e^{r} - 1
        assert_relative_eq!(par, 0.03_f64.exp() - 1.0, epsilon = 1e-14);
    }
}
