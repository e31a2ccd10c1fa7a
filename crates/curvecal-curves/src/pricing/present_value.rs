//! Present value calculator.

use super::{simple_forward, InstrumentVisitor};
use crate::curve_set::CurveSet;
use crate::error::CurveResult;
use crate::instruments::{Bond, CalibratingInstrument, Cash, Fra, Swap};

/// Present value of a calibrating instrument, from the holder's side.
///
/// - Cash: `N * (DF(end) * (1 + r * τ) - DF(start))`
/// - FRA: `N * τ_p * DF_fund(p) * (F - K)`
/// - Swap (receive floating): `Σ N τ_j DF_fund(p_j) (F_j + s) - Σ N K τ_i DF_fund(t_i)`
/// - Bond: `Σ c_i DF(t_i) + N DF(T) - N * dirty_price`
///
/// At the market quote every instrument has zero PV on a curve that reprices
/// it, which makes the PV the calibration residual.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentValueCalculator;

impl PresentValueCalculator {
    /// Present value of an instrument.
    pub fn present_value(
        &self,
        instrument: &CalibratingInstrument,
        curves: &CurveSet<'_>,
    ) -> CurveResult<f64> {
        instrument.accept(self, curves)
    }
}

impl InstrumentVisitor for PresentValueCalculator {
    type Output = f64;

    fn visit_cash(&self, cash: &Cash, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let funding = curves.funding();
        let df_start = funding.discount_factor(cash.start)?;
        let df_end = funding.discount_factor(cash.end)?;
        Ok(cash.notional * (df_end * (1.0 + cash.rate * cash.accrual) - df_start))
    }

    fn visit_fra(&self, fra: &Fra, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let forward = simple_forward(
            curves.forward(),
            fra.fixing_start,
            fra.fixing_end,
            fra.fixing_accrual,
        )?;
        let df_pay = curves.funding().discount_factor(fra.payment_time)?;
        Ok(fra.notional * fra.payment_accrual * df_pay * (forward.rate - fra.strike))
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
            let df_pay = funding.discount_factor(floating.payment_times[j])?;
            floating_pv += floating.payment_accruals[j] * df_pay * (forward.rate + floating.spread);
        }

        let mut annuity = 0.0;
        for (t, accrual) in swap.fixed.payment_times.iter().zip(swap.fixed.accruals.iter()) {
            annuity += accrual * funding.discount_factor(*t)?;
        }

        Ok(swap.notional * (floating_pv - swap.fixed_rate * annuity))
    }

    fn visit_bond(&self, bond: &Bond, curves: &CurveSet<'_>) -> CurveResult<f64> {
        let funding = curves.funding();
        let mut pv = bond.notional * funding.discount_factor(bond.maturity)?;
        for (t, amount) in bond.coupon_times.iter().zip(bond.coupon_amounts.iter()) {
            pv += amount * funding.discount_factor(*t)?;
        }
        Ok(pv - bond.notional * bond.dirty_price)
    }
}
