//! Discount-factor sensitivities of instrument PVs.
//!
//! Each instrument yields [`SensitivityPair`]s of `(time, ∂PV/∂DF(time))`,
//! split by the curve the discount factor is read from.

use serde::{Deserialize, Serialize};

use super::{simple_forward, InstrumentVisitor, SensitivityPair};
use crate::curve::YieldCurve;
use crate::curve_set::CurveSet;
use crate::error::CurveResult;
use crate::instruments::{Bond, CalibratingInstrument, Cash, Fra, Swap};

/// Sensitivities of PV to discount factors on the forward curve.
///
/// Only projected fixings depend on the forward curve. For a fixing over
/// `[s, e]` with accrual `τ_f`, paid as `N τ_p DF_fund(p) F`:
///
/// ```text
/// ∂PV/∂DF_fwd(s) =  N τ_p DF_fund(p) / (τ_f DF_fwd(e))
/// ∂PV/∂DF_fwd(e) = -N τ_p DF_fund(p) DF_fwd(s) / (τ_f DF_fwd(e)²)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardCurveSensitivityCalculator;

/// Sensitivities of PV to discount factors on the funding curve.
///
/// PV is linear in funding discount factors, so the weights are the cashflow
/// amounts themselves (projected with the forward curve where needed).
#[derive(Debug, Clone, Copy, Default)]
pub struct FundingCurveSensitivityCalculator;

/// Both sensitivity lists for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSensitivities {
    /// Pairs on the forward curve.
    pub forward: Vec<SensitivityPair>,
    /// Pairs on the funding curve.
    pub funding: Vec<SensitivityPair>,
}

impl InstrumentSensitivities {
    /// Runs both calculators on an instrument.
    pub fn calculate(
        instrument: &CalibratingInstrument,
        curves: &CurveSet<'_>,
    ) -> CurveResult<Self> {
        Ok(Self {
            forward: instrument.accept(&ForwardCurveSensitivityCalculator, curves)?,
            funding: instrument.accept(&FundingCurveSensitivityCalculator, curves)?,
        })
    }

    /// Forward pairs followed by funding pairs.
    pub fn all(&self) -> impl Iterator<Item = &SensitivityPair> {
        self.forward.iter().chain(self.funding.iter())
    }
}

fn fixing_pairs(
    forward_curve: &YieldCurve,
    start: f64,
    end: f64,
    fixing_accrual: f64,
    payment_weight: f64,
) -> CurveResult<[SensitivityPair; 2]> {
    let forward = simple_forward(forward_curve, start, end, fixing_accrual)?;
    let scale = payment_weight / (fixing_accrual * forward.df_end);
    Ok([
        SensitivityPair::new(start, scale),
        SensitivityPair::new(end, -scale * forward.df_start / forward.df_end),
    ])
}

impl InstrumentVisitor for ForwardCurveSensitivityCalculator {
    type Output = Vec<SensitivityPair>;

    fn visit_cash(&self, _cash: &Cash, _curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        Ok(Vec::new())
    }

    fn visit_fra(&self, fra: &Fra, curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        let df_pay = curves.funding().discount_factor(fra.payment_time)?;
        let pairs = fixing_pairs(
            curves.forward(),
            fra.fixing_start,
            fra.fixing_end,
            fra.fixing_accrual,
            fra.notional * fra.payment_accrual * df_pay,
        )?;
        Ok(pairs.to_vec())
    }

    fn visit_swap(&self, swap: &Swap, curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        let floating = &swap.floating;
        let mut pairs = Vec::with_capacity(2 * floating.len());
        for j in 0..floating.len() {
            let df_pay = curves.funding().discount_factor(floating.payment_times[j])?;
            pairs.extend(fixing_pairs(
                curves.forward(),
                floating.fixing_starts[j],
                floating.fixing_ends[j],
                floating.fixing_accruals[j],
                swap.notional * floating.payment_accruals[j] * df_pay,
            )?);
        }
        Ok(pairs)
    }

    fn visit_bond(&self, _bond: &Bond, _curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        Ok(Vec::new())
    }
}

impl InstrumentVisitor for FundingCurveSensitivityCalculator {
    type Output = Vec<SensitivityPair>;

    fn visit_cash(&self, cash: &Cash, _curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        Ok(vec![
            SensitivityPair::new(cash.start, -cash.notional),
            SensitivityPair::new(cash.end, cash.notional * (1.0 + cash.rate * cash.accrual)),
        ])
    }

    fn visit_fra(&self, fra: &Fra, curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        let forward = simple_forward(
            curves.forward(),
            fra.fixing_start,
            fra.fixing_end,
            fra.fixing_accrual,
        )?;
        Ok(vec![SensitivityPair::new(
            fra.payment_time,
            fra.notional * fra.payment_accrual * (forward.rate - fra.strike),
        )])
    }

    fn visit_swap(&self, swap: &Swap, curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        let floating = &swap.floating;
        let mut pairs = Vec::with_capacity(floating.len() + swap.fixed.payment_times.len());
        for j in 0..floating.len() {
            let forward = simple_forward(
                curves.forward(),
                floating.fixing_starts[j],
                floating.fixing_ends[j],
                floating.fixing_accruals[j],
            )?;
            pairs.push(SensitivityPair::new(
                floating.payment_times[j],
                swap.notional * floating.payment_accruals[j] * (forward.rate + floating.spread),
            ));
        }
        for (t, accrual) in swap.fixed.payment_times.iter().zip(swap.fixed.accruals.iter()) {
            pairs.push(SensitivityPair::new(
                *t,
                -swap.notional * swap.fixed_rate * accrual,
            ));
        }
        Ok(pairs)
    }

    fn visit_bond(&self, bond: &Bond, _curves: &CurveSet<'_>) -> CurveResult<Self::Output> {
        let mut pairs: Vec<SensitivityPair> = bond
            .coupon_times
            .iter()
            .zip(bond.coupon_amounts.iter())
            .map(|(t, amount)| SensitivityPair::new(*t, *amount))
            .collect();
        pairs.push(SensitivityPair::new(bond.maturity, bond.notional));
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveDefinition, CurveValueType};
    use crate::instruments::Frequency;
    use crate::pricing::PresentValueCalculator;

    fn df_curve(nodes: &[(f64, f64)]) -> YieldCurve {
        YieldCurve::new(
            CurveDefinition::new(
                nodes.iter().map(|n| n.0).collect(),
                nodes.iter().map(|n| n.1).collect(),
            )
            .with_value_type(CurveValueType::DiscountFactor)
            .with_anchor(1.0),
        )
        .unwrap()
    }

    fn pv(instrument: &CalibratingInstrument, funding: &[(f64, f64)], forward: &[(f64, f64)]) -> f64 {
        let funding = df_curve(funding);
        let forward = df_curve(forward);
        PresentValueCalculator
            .present_value(instrument, &CurveSet::new(&funding, &forward))
            .unwrap()
    }

    fn weight_at(pairs: &[SensitivityPair], t: f64) -> f64 {
        pairs
            .iter()
            .filter(|p| (p.time - t).abs() < 1e-12)
            .map(|p| p.weight)
            .sum()
    }

    #[test]
    fn test_pairs_match_discount_factor_bumps() {
        // Discount-factor curves with a node at every cashflow time, so bumping
        // a node moves exactly one discount factor.
        let swap: CalibratingInstrument =
            Swap::vanilla(0.0, 1.0, Frequency::SemiAnnual, Frequency::SemiAnnual, 0.03, 100.0)
                .unwrap()
                .into();
        let funding_nodes = vec![(0.5, 0.985), (1.0, 0.97)];
        let forward_nodes = vec![(0.5, 0.984), (1.0, 0.968)];

        let funding = df_curve(&funding_nodes);
        let forward = df_curve(&forward_nodes);
        let sens =
            InstrumentSensitivities::calculate(&swap, &CurveSet::new(&funding, &forward)).unwrap();

        let h = 1e-7;
        for k in 0..2 {
            let t = funding_nodes[k].0;
            let mut up = funding_nodes.clone();
            up[k].1 += h;
            let mut down = funding_nodes.clone();
            down[k].1 -= h;
            let numerical =
                (pv(&swap, &up, &forward_nodes) - pv(&swap, &down, &forward_nodes)) / (2.0 * h);
            assert!((weight_at(&sens.funding, t) - numerical).abs() < 1e-5, "funding t={t}");

            let mut up = forward_nodes.clone();
            up[k].1 += h;
            let mut down = forward_nodes.clone();
            down[k].1 -= h;
            let numerical =
                (pv(&swap, &funding_nodes, &up) - pv(&swap, &funding_nodes, &down)) / (2.0 * h);
            assert!((weight_at(&sens.forward, t) - numerical).abs() < 1e-5, "forward t={t}");
        }
    }

    #[test]
    fn test_cash_and_bond_have_no_forward_pairs() {
        let curve = YieldCurve::flat(0.03).unwrap();
        let curves = CurveSet::single(&curve);
        let cash: CalibratingInstrument = Cash::new(0.0, 0.25, 0.03, 1.0).into();
        let sens = InstrumentSensitivities::calculate(&cash, &curves).unwrap();
        assert!(sens.forward.is_empty());
        assert_eq!(sens.funding.len(), 2);

        let bond: CalibratingInstrument =
            Bond::fixed_coupon(0.04, 2.0, Frequency::Annual, 100.0, 1.0).unwrap().into();
        let sens = InstrumentSensitivities::calculate(&bond, &curves).unwrap();
        assert!(sens.forward.is_empty());
        assert_eq!(sens.funding.len(), 3);
        assert_eq!(sens.all().count(), 3);
    }
}
