//! CLI command implementations.

pub mod calibrate;
pub mod implied_repo;

pub use calibrate::CalibrateArgs;
pub use implied_repo::ImpliedRepoArgs;

use chrono::NaiveDate;
use clap::ValueEnum;
use curvecal_curves::instruments::Frequency;

use crate::error::{CliError, CliResult};

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Validates a coupon rate in percent.
pub fn validate_coupon(coupon: f64) -> CliResult<f64> {
    if !(0.0..=100.0).contains(&coupon) {
        return Err(CliError::InvalidCoupon(coupon));
    }
    Ok(coupon)
}

/// Validates a price value.
pub fn validate_price(price: f64) -> CliResult<f64> {
    if !(price.is_finite() && price > 0.0) {
        return Err(CliError::InvalidPrice(price));
    }
    Ok(price)
}

/// Frequency choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum FrequencyChoice {
    /// Annual (1/year)
    Annual,
    /// Semi-annual (2/year)
    #[default]
    #[value(name = "semi-annual")]
    SemiAnnual,
    /// Quarterly (4/year)
    Quarterly,
    /// Monthly (12/year)
    Monthly,
}

impl From<FrequencyChoice> for Frequency {
    fn from(choice: FrequencyChoice) -> Self {
        match choice {
            FrequencyChoice::Annual => Frequency::Annual,
            FrequencyChoice::SemiAnnual => Frequency::SemiAnnual,
            FrequencyChoice::Quarterly => Frequency::Quarterly,
            FrequencyChoice::Monthly => Frequency::Monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-20").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
        );
        assert!(matches!(parse_date("20/03/2025"), Err(CliError::InvalidDate(_))));
    }

    #[test]
    fn test_validators() {
        assert!(validate_coupon(5.0).is_ok());
        assert!(validate_coupon(-1.0).is_err());
        assert!(validate_price(101.0).is_ok());
        assert!(validate_price(0.0).is_err());
    }
}
