//! Bond-future basis analytics.
//!
//! Prices (clean, futures, accrued) are quoted in the same units as the
//! deliverable's notional, e.g. per 100 face. Times are on the curve time
//! axis and carry is accrued with a pluggable [`AccrualBasis`].
//!
//! - gross basis: `clean - futures_price * cf`
//! - net basis: forward dirty price at delivery minus invoice price, with the
//!   repo rate compounded as `r = ln(1 + repo)` and intermediate coupons
//!   reinvested to delivery
//! - implied repo: the repo rate at which the net basis is zero, found by
//!   bracketing from `(0.0, 0.2)` and Brent, or in closed form with simple
//!   interest for a whole basket

mod calculator;

pub use calculator::{BondFutureCalculator, DeliverableAnalytics, DeliverableQuote};

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::instruments::Bond;

/// A bond future and its basket of deliverable bonds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondFuture {
    deliverables: Vec<Bond>,
    conversion_factors: Vec<f64>,
}

impl BondFuture {
    /// Creates a future from its deliverables and their conversion factors.
    ///
    /// # Errors
    ///
    /// Returns an error if the basket is empty, the lengths differ, a
    /// conversion factor is not positive, or a bond is invalid.
    pub fn new(deliverables: Vec<Bond>, conversion_factors: Vec<f64>) -> CurveResult<Self> {
        if deliverables.is_empty() {
            return Err(CurveError::invalid_input(
                "bond future needs at least one deliverable",
            ));
        }
        if deliverables.len() != conversion_factors.len() {
            return Err(CurveError::invalid_input(format!(
                "{} deliverables but {} conversion factors",
                deliverables.len(),
                conversion_factors.len()
            )));
        }
        for (i, cf) in conversion_factors.iter().enumerate() {
            if !(cf.is_finite() && *cf > 0.0) {
                return Err(CurveError::invalid_value(format!(
                    "conversion factor {i} must be positive, got {cf}"
                )));
            }
        }
        for bond in &deliverables {
            bond.validate()?;
        }
        Ok(Self {
            deliverables,
            conversion_factors,
        })
    }

    /// Deliverable bonds.
    #[must_use]
    pub fn deliverables(&self) -> &[Bond] {
        &self.deliverables
    }

    /// Conversion factors, one per deliverable.
    #[must_use]
    pub fn conversion_factors(&self) -> &[f64] {
        &self.conversion_factors
    }

    /// Number of deliverables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deliverables.len()
    }

    /// Always false for a constructed future.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deliverables.is_empty()
    }

    /// Deliverables paired with their conversion factors.
    pub fn basket(&self) -> impl Iterator<Item = (&Bond, f64)> + '_ {
        self.deliverables
            .iter()
            .zip(self.conversion_factors.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::Frequency;

    fn bond(maturity: f64) -> Bond {
        Bond::fixed_coupon(0.05, maturity, Frequency::SemiAnnual, 100.0, 1.0).unwrap()
    }

    #[test]
    fn test_new_validates_lengths() {
        assert!(BondFuture::new(vec![bond(5.0), bond(7.0)], vec![0.9]).is_err());
        assert!(BondFuture::new(vec![], vec![]).is_err());
        assert!(BondFuture::new(vec![bond(5.0)], vec![0.0]).is_err());

        let future = BondFuture::new(vec![bond(5.0), bond(7.0)], vec![0.91, 0.95]).unwrap();
        assert_eq!(future.len(), 2);
        assert!(!future.is_empty());
        assert_eq!(future.basket().map(|(_, cf)| cf).collect::<Vec<_>>(), vec![0.91, 0.95]);
    }
}
