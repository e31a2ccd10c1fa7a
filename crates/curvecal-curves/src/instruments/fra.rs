//! Forward rate agreement.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_positive, check_time};
use crate::error::{CurveError, CurveResult};

/// A forward rate agreement paying `notional * payment_accrual * (F - strike)`
/// at `payment_time`, with `F` the simple forward rate over the fixing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fra {
    /// Start of the fixing period.
    pub fixing_start: f64,
    /// End of the fixing period.
    pub fixing_end: f64,
    /// Year fraction of the fixing period.
    pub fixing_accrual: f64,
    /// Payment time.
    pub payment_time: f64,
    /// Year fraction applied to the payment.
    pub payment_accrual: f64,
    /// Contract rate.
    pub strike: f64,
    /// Notional.
    pub notional: f64,
}

impl Fra {
    /// Creates a FRA over `[start, end]` settled at `end`.
    #[must_use]
    pub fn new(start: f64, end: f64, strike: f64, notional: f64) -> Self {
        Self {
            fixing_start: start,
            fixing_end: end,
            fixing_accrual: end - start,
            payment_time: end,
            payment_accrual: end - start,
            strike,
            notional,
        }
    }

    /// Moves the payment to another time.
    #[must_use]
    pub fn with_payment_time(mut self, payment_time: f64) -> Self {
        self.payment_time = payment_time;
        self
    }

    /// Checks times, accruals and notional.
    pub fn validate(&self) -> CurveResult<()> {
        check_time("fra fixing start", self.fixing_start)?;
        check_time("fra fixing end", self.fixing_end)?;
        check_time("fra payment time", self.payment_time)?;
        if self.fixing_end <= self.fixing_start {
            return Err(CurveError::invalid_input(format!(
                "fra fixing end {} must be after fixing start {}",
                self.fixing_end, self.fixing_start
            )));
        }
        check_positive("fra fixing accrual", self.fixing_accrual)?;
        check_positive("fra payment accrual", self.payment_accrual)?;
        check_finite("fra strike", self.strike)?;
        check_positive("fra notional", self.notional)
    }
}
