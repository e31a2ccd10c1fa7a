//! Fixed-coupon bond.

use serde::{Deserialize, Serialize};

use super::schedule::{Frequency, Schedule};
use super::{check_finite, check_positive, check_time, check_times};
use crate::error::{CurveError, CurveResult};

/// A fixed-coupon bullet bond quoted by dirty price per unit notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    /// Coupon payment times.
    pub coupon_times: Vec<f64>,
    /// Coupon amounts, in the same units as the notional.
    pub coupon_amounts: Vec<f64>,
    /// Principal repayment time.
    pub maturity: f64,
    /// Notional.
    pub notional: f64,
    /// Dirty price per unit notional (1.0 = par).
    pub dirty_price: f64,
}

impl Bond {
    /// Builds a bond paying `notional * coupon_rate * accrual` each period up to `maturity`.
    pub fn fixed_coupon(
        coupon_rate: f64,
        maturity: f64,
        frequency: Frequency,
        notional: f64,
        dirty_price: f64,
    ) -> CurveResult<Self> {
        let schedule = Schedule::regular(0.0, maturity, frequency)?;
        Ok(Self {
            coupon_times: schedule.payment_times(),
            coupon_amounts: schedule
                .accruals()
                .iter()
                .map(|accrual| notional * coupon_rate * accrual)
                .collect(),
            maturity,
            notional,
            dirty_price,
        })
    }

    /// Coupons paid at or before `t`, as (time, amount) pairs.
    pub fn coupons_until(&self, t: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.coupon_times
            .iter()
            .copied()
            .zip(self.coupon_amounts.iter().copied())
            .take_while(move |(time, _)| *time <= t)
    }

    /// First coupon amount, or zero for a zero-coupon bond.
    #[must_use]
    pub fn first_coupon(&self) -> f64 {
        self.coupon_amounts.first().copied().unwrap_or(0.0)
    }

    /// Checks schedule arrays, notional and price.
    pub fn validate(&self) -> CurveResult<()> {
        if self.coupon_times.len() != self.coupon_amounts.len() {
            return Err(CurveError::invalid_input(format!(
                "bond has {} coupon times but {} amounts",
                self.coupon_times.len(),
                self.coupon_amounts.len()
            )));
        }
        check_times("coupon time", &self.coupon_times)?;
        for amount in &self.coupon_amounts {
            check_finite("coupon amount", *amount)?;
        }
        check_time("bond maturity", self.maturity)?;
        if self.coupon_times.iter().any(|t| *t > self.maturity) {
            return Err(CurveError::invalid_input(
                "coupons cannot be paid after bond maturity",
            ));
        }
        check_positive("bond notional", self.notional)?;
        check_positive("bond dirty price", self.dirty_price)
    }
}
