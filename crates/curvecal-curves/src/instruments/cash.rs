//! Cash deposit.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_positive, check_time};
use crate::error::{CurveError, CurveResult};

/// A simple-interest deposit from `start` to `end`.
///
/// The lender pays the notional at `start` and receives
/// `notional * (1 + rate * accrual)` at `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cash {
    /// Deposit start time.
    pub start: f64,
    /// Deposit end time.
    pub end: f64,
    /// Accrual year fraction.
    pub accrual: f64,
    /// Quoted simple rate.
    pub rate: f64,
    /// Notional.
    pub notional: f64,
}

impl Cash {
    /// Creates a deposit accruing over `end - start`.
    #[must_use]
    pub fn new(start: f64, end: f64, rate: f64, notional: f64) -> Self {
        Self {
            start,
            end,
            accrual: end - start,
            rate,
            notional,
        }
    }

    /// Overrides the accrual year fraction.
    #[must_use]
    pub fn with_accrual(mut self, accrual: f64) -> Self {
        self.accrual = accrual;
        self
    }

    /// Checks times, accrual and notional.
    pub fn validate(&self) -> CurveResult<()> {
        check_time("cash start", self.start)?;
        check_time("cash end", self.end)?;
        if self.end <= self.start {
            return Err(CurveError::invalid_input(format!(
                "cash end {} must be after start {}",
                self.end, self.start
            )));
        }
        check_positive("cash accrual", self.accrual)?;
        check_finite("cash rate", self.rate)?;
        check_positive("cash notional", self.notional)
    }
}
