//! Fixed-for-floating interest rate swap.

use serde::{Deserialize, Serialize};

use super::schedule::{Frequency, Schedule};
use super::{check_finite, check_positive, check_times};
use crate::error::{CurveError, CurveResult};

/// Fixed leg: coupons `notional * fixed_rate * accrual` paid at each payment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedLeg {
    /// Payment times.
    pub payment_times: Vec<f64>,
    /// Accrual year fractions, one per payment.
    pub accruals: Vec<f64>,
}

/// Floating leg: each period pays `notional * payment_accrual * (F + spread)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingLeg {
    /// Fixing period starts.
    pub fixing_starts: Vec<f64>,
    /// Fixing period ends.
    pub fixing_ends: Vec<f64>,
    /// Fixing period year fractions.
    pub fixing_accruals: Vec<f64>,
    /// Payment times.
    pub payment_times: Vec<f64>,
    /// Payment year fractions.
    pub payment_accruals: Vec<f64>,
    /// Spread over the projected rate.
    #[serde(default)]
    pub spread: f64,
}

impl FloatingLeg {
    /// Number of floating periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payment_times.len()
    }

    /// True if the leg has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payment_times.is_empty()
    }
}

/// A swap receiving the floating leg and paying the fixed leg.
///
/// Both legs share one notional and the funding curve discounts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    /// Notional.
    pub notional: f64,
    /// Fixed coupon rate.
    pub fixed_rate: f64,
    /// Fixed leg schedule.
    pub fixed: FixedLeg,
    /// Floating leg schedule.
    pub floating: FloatingLeg,
}

impl Swap {
    /// Builds a vanilla swap from regular schedules on both legs.
    ///
    /// Floating periods fix and pay over their own accrual period.
    pub fn vanilla(
        start: f64,
        maturity: f64,
        fixed_frequency: Frequency,
        floating_frequency: Frequency,
        fixed_rate: f64,
        notional: f64,
    ) -> CurveResult<Self> {
        let fixed = Schedule::regular(start, maturity, fixed_frequency)?;
        let floating = Schedule::regular(start, maturity, floating_frequency)?;
        let periods = floating.periods();

        Ok(Self {
            notional,
            fixed_rate,
            fixed: FixedLeg {
                payment_times: fixed.payment_times(),
                accruals: fixed.accruals(),
            },
            floating: FloatingLeg {
                fixing_starts: periods.iter().map(|p| p.start).collect(),
                fixing_ends: periods.iter().map(|p| p.end).collect(),
                fixing_accruals: floating.accruals(),
                payment_times: floating.payment_times(),
                payment_accruals: floating.accruals(),
                spread: 0.0,
            },
        })
    }

    /// Sets the floating spread.
    #[must_use]
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.floating.spread = spread;
        self
    }

    /// Last payment time on either leg.
    #[must_use]
    pub fn maturity(&self) -> f64 {
        self.fixed
            .payment_times
            .iter()
            .chain(self.floating.payment_times.iter())
            .copied()
            .fold(0.0, f64::max)
    }

    /// Checks that schedule arrays are consistent and well formed.
    pub fn validate(&self) -> CurveResult<()> {
        check_positive("swap notional", self.notional)?;
        check_finite("swap fixed rate", self.fixed_rate)?;
        check_finite("swap spread", self.floating.spread)?;

        if self.fixed.payment_times.is_empty() || self.floating.is_empty() {
            return Err(CurveError::invalid_input("swap legs must have at least one period"));
        }
        if self.fixed.accruals.len() != self.fixed.payment_times.len() {
            return Err(CurveError::invalid_input(format!(
                "fixed leg has {} payment times but {} accruals",
                self.fixed.payment_times.len(),
                self.fixed.accruals.len()
            )));
        }
        let n = self.floating.len();
        let lengths = [
            ("fixing starts", self.floating.fixing_starts.len()),
            ("fixing ends", self.floating.fixing_ends.len()),
            ("fixing accruals", self.floating.fixing_accruals.len()),
            ("payment accruals", self.floating.payment_accruals.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(CurveError::invalid_input(format!(
                "floating leg has {n} payment times but {len} {name}"
            )));
        }

        check_times("fixed payment time", &self.fixed.payment_times)?;
        check_times("floating payment time", &self.floating.payment_times)?;
        check_times("fixing start", &self.floating.fixing_starts)?;
        check_times("fixing end", &self.floating.fixing_ends)?;
        for (start, end) in self
            .floating
            .fixing_starts
            .iter()
            .zip(self.floating.fixing_ends.iter())
        {
            if end <= start {
                return Err(CurveError::invalid_input(format!(
                    "fixing period [{start}, {end}] is empty"
                )));
            }
        }
        for accrual in self
            .fixed
            .accruals
            .iter()
            .chain(self.floating.fixing_accruals.iter())
            .chain(self.floating.payment_accruals.iter())
        {
            check_positive("swap accrual", *accrual)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vanilla_schedule() {
        let swap = Swap::vanilla(0.0, 2.0, Frequency::Annual, Frequency::Quarterly, 0.03, 1.0)
            .unwrap();
        assert_eq!(swap.fixed.payment_times.len(), 2);
        assert_eq!(swap.floating.len(), 8);
        assert_relative_eq!(swap.maturity(), 2.0, epsilon = 1e-12);
        assert!(swap.validate().is_ok());
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        let mut swap =
            Swap::vanilla(0.0, 1.0, Frequency::SemiAnnual, Frequency::SemiAnnual, 0.03, 1.0)
                .unwrap();
        swap.floating.fixing_ends.pop();
        assert!(matches!(swap.validate(), Err(CurveError::InvalidInput { .. })));
    }
}
