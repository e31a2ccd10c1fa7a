//! Bond-future basis calculator.
//!
//! Gross basis, net basis and implied repo rate for each deliverable in a
//! basket. Carry to delivery is accrued with a pluggable [`AccrualBasis`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BondFuture;
use crate::config::RootFinderSettings;
use crate::daycount::{AccrualBasis, TimeDifference};
use crate::error::{CurveError, CurveResult};
use crate::instruments::Bond;
use crate::parallel::maybe_parallel_try_map;

/// Market inputs for one deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliverableQuote {
    /// Delivery time.
    pub delivery: f64,
    /// Clean price today.
    pub clean_price: f64,
    /// Accrued interest, in price units.
    pub accrued: f64,
    /// Quoted term repo rate to delivery.
    pub repo_rate: f64,
}

/// Basis analytics for one deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliverableAnalytics {
    /// Clean price minus converted futures price.
    pub gross_basis: f64,
    /// Net basis at the quoted repo rate.
    pub net_basis: f64,
    /// Simple-interest implied repo rate.
    pub implied_repo: f64,
}

/// Gross basis, net basis and implied repo calculator.
#[derive(Debug, Clone)]
pub struct BondFutureCalculator {
    accrual: Arc<dyn AccrualBasis>,
    root_finder: RootFinderSettings,
    parallel: bool,
}

impl Default for BondFutureCalculator {
    fn default() -> Self {
        Self {
            accrual: Arc::new(TimeDifference),
            root_finder: RootFinderSettings::default().with_initial_bracket(0.0, 0.2),
            parallel: false,
        }
    }
}

impl BondFutureCalculator {
    /// Calculator accruing carry with `TimeDifference`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accrues carry with the given basis.
    #[must_use]
    pub fn with_accrual_basis(mut self, accrual: impl AccrualBasis + 'static) -> Self {
        self.accrual = Arc::new(accrual);
        self
    }

    /// Root-finder settings for [`Self::implied_repo_rate`].
    #[must_use]
    pub fn with_root_finder(mut self, root_finder: RootFinderSettings) -> Self {
        self.root_finder = root_finder;
        self
    }

    /// Processes basket deliverables in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The carry accrual basis.
    #[must_use]
    pub fn accrual_basis(&self) -> &dyn AccrualBasis {
        self.accrual.as_ref()
    }

    /// `clean - futures_price * conversion_factor`.
    #[must_use]
    pub fn gross_basis(clean_price: f64, futures_price: f64, conversion_factor: f64) -> f64 {
        clean_price - futures_price * conversion_factor
    }

    /// Net basis with accrued interest expressed as a fraction of the first coupon.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite prices, a non-positive futures price or
    /// conversion factor, delivery outside `(0, maturity)`, or `repo <= -1`.
    #[allow(clippy::too_many_arguments)]
    pub fn net_basis(
        &self,
        bond: &Bond,
        delivery: f64,
        clean_price: f64,
        futures_price: f64,
        conversion_factor: f64,
        accrued_fraction: f64,
        repo_rate: f64,
    ) -> CurveResult<f64> {
        check_deliverable(bond, delivery, clean_price, futures_price, conversion_factor)?;
        if !(repo_rate.is_finite() && repo_rate > -1.0) {
            return Err(CurveError::invalid_value(format!(
                "repo rate must be greater than -1, got {repo_rate}"
            )));
        }
        let accrued = bond.first_coupon() * accrued_fraction;
        Ok(self.net_basis_unchecked(
            bond,
            delivery,
            clean_price + accrued,
            futures_price * conversion_factor + accrued,
            repo_rate,
        ))
    }

    /// Repo rate zeroing [`Self::net_basis`], by bracketing and Brent.
    ///
    /// # Errors
    ///
    /// Returns the input errors of [`Self::net_basis`], `Bracketing` if no
    /// sign change is found, or a solver error.
    pub fn implied_repo_rate(
        &self,
        bond: &Bond,
        delivery: f64,
        clean_price: f64,
        futures_price: f64,
        conversion_factor: f64,
        accrued_fraction: f64,
    ) -> CurveResult<f64> {
        check_deliverable(bond, delivery, clean_price, futures_price, conversion_factor)?;
        let accrued = bond.first_coupon() * accrued_fraction;
        let dirty = clean_price + accrued;
        let invoice = futures_price * conversion_factor + accrued;

        let repo = self.root_finder.solve(|repo| {
            if repo <= -1.0 {
                return f64::NAN;
            }
            self.net_basis_unchecked(bond, delivery, dirty, invoice, repo)
        })?;
        debug!(delivery, clean_price, futures_price, repo, "implied repo rate");
        Ok(repo)
    }

    /// Closed-form simple-interest implied repo rate for every deliverable.
    ///
    /// `(invoice - dirty + Σc) / (dirty·T - Σ c·yf(t_i, T))` over coupons paid
    /// up to delivery, with `invoice = futures_price·cf + accrued` and
    /// `dirty = clean + accrued`.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote count differs from the basket size, the
    /// futures price is not positive, or a quote is invalid.
    pub fn implied_repo_rates(
        &self,
        future: &BondFuture,
        quotes: &[DeliverableQuote],
        futures_price: f64,
    ) -> CurveResult<Vec<f64>> {
        Ok(self
            .analyze(future, quotes, futures_price)?
            .into_iter()
            .map(|a| a.implied_repo)
            .collect())
    }

    /// Gross basis, net basis at the quoted repo and implied repo per deliverable.
    pub fn analyze(
        &self,
        future: &BondFuture,
        quotes: &[DeliverableQuote],
        futures_price: f64,
    ) -> CurveResult<Vec<DeliverableAnalytics>> {
        if !(futures_price.is_finite() && futures_price > 0.0) {
            return Err(CurveError::invalid_value(format!(
                "futures price must be positive, got {futures_price}"
            )));
        }
        if quotes.len() != future.len() {
            return Err(CurveError::invalid_input(format!(
                "need one quote per deliverable: {} quotes for {} deliverables",
                quotes.len(),
                future.len()
            )));
        }

        let basket: Vec<(&Bond, f64, &DeliverableQuote)> = future
            .basket()
            .zip(quotes.iter())
            .map(|((bond, cf), quote)| (bond, cf, quote))
            .collect();

        maybe_parallel_try_map(&basket, self.parallel, |(bond, cf, quote)| {
            self.analyze_one(bond, *cf, quote, futures_price)
        })
    }

    fn analyze_one(
        &self,
        bond: &Bond,
        conversion_factor: f64,
        quote: &DeliverableQuote,
        futures_price: f64,
    ) -> CurveResult<DeliverableAnalytics> {
        check_deliverable(
            bond,
            quote.delivery,
            quote.clean_price,
            futures_price,
            conversion_factor,
        )?;
        if !quote.accrued.is_finite() {
            return Err(CurveError::invalid_value("accrued interest must be finite"));
        }
        if !(quote.repo_rate.is_finite() && quote.repo_rate > -1.0) {
            return Err(CurveError::invalid_value(format!(
                "repo rate must be greater than -1, got {}",
                quote.repo_rate
            )));
        }

        let delivery = quote.delivery;
        let dirty = quote.clean_price + quote.accrued;
        let invoice = futures_price * conversion_factor + quote.accrued;

        let (coupon_sum, weighted_sum) = bond
            .coupons_until(delivery)
            .fold((0.0, 0.0), |(sum, weighted), (t, c)| {
                (sum + c, weighted + c * self.accrual.accrual(t, delivery))
            });
        let denominator = dirty * self.accrual.accrual(0.0, delivery) - weighted_sum;
        if denominator.abs() < f64::EPSILON {
            return Err(CurveError::invalid_value(
                "implied repo undefined: carry denominator is zero",
            ));
        }

        Ok(DeliverableAnalytics {
            gross_basis: Self::gross_basis(quote.clean_price, futures_price, conversion_factor),
            net_basis: self.net_basis_unchecked(bond, delivery, dirty, invoice, quote.repo_rate),
            implied_repo: (invoice - dirty + coupon_sum) / denominator,
        })
    }

    fn net_basis_unchecked(
        &self,
        bond: &Bond,
        delivery: f64,
        dirty: f64,
        invoice: f64,
        repo_rate: f64,
    ) -> f64 {
        let r = repo_rate.ln_1p();
        let carried = dirty * (r * self.accrual.accrual(0.0, delivery)).exp();
        let reinvested: f64 = bond
            .coupons_until(delivery)
            .map(|(t, c)| c * (r * self.accrual.accrual(t, delivery)).exp())
            .sum();
        carried - reinvested - invoice
    }
}

fn check_deliverable(
    bond: &Bond,
    delivery: f64,
    clean_price: f64,
    futures_price: f64,
    conversion_factor: f64,
) -> CurveResult<()> {
    if !(delivery.is_finite() && delivery > 0.0 && delivery < bond.maturity) {
        return Err(CurveError::invalid_input(format!(
            "delivery {delivery} must lie in (0, {})",
            bond.maturity
        )));
    }
    if !clean_price.is_finite() {
        return Err(CurveError::invalid_value("clean price must be finite"));
    }
    if !(futures_price.is_finite() && futures_price > 0.0) {
        return Err(CurveError::invalid_value(format!(
            "futures price must be positive, got {futures_price}"
        )));
    }
    if !(conversion_factor.is_finite() && conversion_factor > 0.0) {
        return Err(CurveError::invalid_value(format!(
            "conversion factor must be positive, got {conversion_factor}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daycount::DayCountConvention;
    use crate::instruments::Frequency;
    use approx::assert_relative_eq;

    fn bond() -> Bond {
        Bond::fixed_coupon(0.06, 10.0, Frequency::SemiAnnual, 100.0, 1.0).unwrap()
    }

    #[test]
    fn test_gross_basis() {
        assert_relative_eq!(
            BondFutureCalculator::gross_basis(101.0, 110.0, 0.9),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_net_basis_without_coupons() {
        let calc = BondFutureCalculator::new();
        // Delivery before the first coupon: forward dirty = dirty * (1 + repo)^T
        let nb = calc
            .net_basis(&bond(), 0.25, 100.0, 110.0, 0.9, 0.5, 0.04)
            .unwrap();
        let dirty = 100.0 + 1.5;
        let invoice = 99.0 + 1.5;
        assert_relative_eq!(nb, dirty * 1.04_f64.powf(0.25) - invoice, epsilon = 1e-10);
    }

    #[test]
    fn test_net_basis_increases_with_repo() {
        let calc = BondFutureCalculator::new();
        let b = bond();
        let low = calc.net_basis(&b, 0.75, 100.0, 110.0, 0.9, 0.0, 0.01).unwrap();
        let high = calc.net_basis(&b, 0.75, 100.0, 110.0, 0.9, 0.0, 0.05).unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_implied_repo_zeroes_net_basis() {
        let calc = BondFutureCalculator::new();
        let b = bond();
        let repo = calc
            .implied_repo_rate(&b, 0.75, 98.0, 108.0, 0.9, 0.2)
            .unwrap();
        let nb = calc.net_basis(&b, 0.75, 98.0, 108.0, 0.9, 0.2, repo).unwrap();
        assert!(nb.abs() < 1e-9, "net basis {nb} at repo {repo}");
    }

    #[test]
    fn test_closed_form_matches_compounded_at_one_year() {
        // No coupon before delivery and T = 1: simple and compounded carry agree.
        let b = Bond {
            coupon_times: vec![1.5, 2.5],
            coupon_amounts: vec![5.0, 5.0],
            maturity: 2.5,
            notional: 100.0,
            dirty_price: 1.0,
        };
        let future = BondFuture::new(vec![b.clone()], vec![1.0]).unwrap();
        let calc = BondFutureCalculator::new();
        let quote = DeliverableQuote {
            delivery: 1.0,
            clean_price: 100.0,
            accrued: 2.5,
            repo_rate: 0.03,
        };
        let closed = calc.implied_repo_rates(&future, &[quote], 103.0).unwrap();
        let brent = calc
            .implied_repo_rate(&b, 1.0, 100.0, 103.0, 1.0, 0.5)
            .unwrap();
        assert_relative_eq!(closed[0], 3.0 / 102.5, epsilon = 1e-12);
        assert_relative_eq!(closed[0], brent, epsilon = 1e-9);
    }

    #[test]
    fn test_analyze_reports_net_basis_at_quoted_repo() {
        let future = BondFuture::new(vec![bond()], vec![0.9]).unwrap();
        let calc = BondFutureCalculator::new();
        let quote = DeliverableQuote {
            delivery: 0.75,
            clean_price: 98.0,
            accrued: 0.6,
            repo_rate: 0.02,
        };
        let analytics = calc.analyze(&future, &[quote], 108.0).unwrap();
        assert_relative_eq!(analytics[0].gross_basis, 98.0 - 97.2, epsilon = 1e-12);
        let direct = calc
            .net_basis(&bond(), 0.75, 98.0, 108.0, 0.9, 0.2, 0.02)
            .unwrap();
        assert_relative_eq!(analytics[0].net_basis, direct, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_form_validates_basket() {
        let future = BondFuture::new(vec![bond(), bond()], vec![0.9, 0.95]).unwrap();
        let calc = BondFutureCalculator::new();
        let quote = DeliverableQuote {
            delivery: 0.75,
            clean_price: 98.0,
            accrued: 0.6,
            repo_rate: 0.02,
        };
        assert!(calc.implied_repo_rates(&future, &[quote], 108.0).is_err());
        assert!(calc.implied_repo_rates(&future, &[quote, quote], 0.0).is_err());
        let late = DeliverableQuote {
            delivery: 12.0,
            ..quote
        };
        assert!(calc.implied_repo_rates(&future, &[quote, late], 108.0).is_err());
    }

    #[test]
    fn test_accrual_basis_changes_carry() {
        let future = BondFuture::new(vec![bond()], vec![0.9]).unwrap();
        let quote = DeliverableQuote {
            delivery: 0.75,
            clean_price: 98.0,
            accrued: 0.6,
            repo_rate: 0.02,
        };
        let plain = BondFutureCalculator::new()
            .implied_repo_rates(&future, &[quote], 108.0)
            .unwrap();
        let act360 = BondFutureCalculator::new()
            .with_accrual_basis(DayCountConvention::Act360)
            .implied_repo_rates(&future, &[quote], 108.0)
            .unwrap();
        assert!((plain[0] - act360[0]).abs() > 1e-6);
        assert_eq!(
            BondFutureCalculator::new()
                .with_accrual_basis(DayCountConvention::Act360)
                .accrual_basis()
                .name(),
            "ACT/360"
        );
    }
}
