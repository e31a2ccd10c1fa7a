//! Day counts and accrual bases.
//!
//! Times throughout the crate are year fractions on the ACT/365 Fixed axis
//! measured from the valuation date. [`DayCountConvention::time_between`]
//! resolves calendar dates onto that axis; [`AccrualBasis`] turns a pair of
//! times back into an accrual fraction under a given convention.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// Days per year on the time axis.
pub const TIME_AXIS_DAYS: f64 = 365.0;

/// Accrual year fraction between two points on the time axis.
pub trait AccrualBasis: Send + Sync + fmt::Debug {
    /// Convention name.
    fn name(&self) -> &'static str;

    /// Accrual fraction from `start` to `end`.
    fn accrual(&self, start: f64, end: f64) -> f64;
}

/// The plain time difference `end - start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeDifference;

impl AccrualBasis for TimeDifference {
    fn name(&self) -> &'static str {
        "TIME"
    }

    fn accrual(&self, start: f64, end: f64) -> f64 {
        end - start
    }
}

/// Actual-days day count conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCountConvention {
    /// Actual/360, money market convention.
    Act360,
    /// Actual/365 Fixed.
    #[default]
    Act365Fixed,
}

impl DayCountConvention {
    /// Year basis in days.
    #[must_use]
    pub fn days_per_year(self) -> f64 {
        match self {
            Self::Act360 => 360.0,
            Self::Act365Fixed => 365.0,
        }
    }

    /// Year fraction between two dates. Negative when `end` precedes `start`.
    #[must_use]
    pub fn year_fraction(self, start: NaiveDate, end: NaiveDate) -> f64 {
        let days = (end - start).num_days();
        days as f64 / self.days_per_year()
    }

    /// Position of `date` on the time axis, measured from `valuation`.
    #[must_use]
    pub fn time_between(valuation: NaiveDate, date: NaiveDate) -> f64 {
        Self::Act365Fixed.year_fraction(valuation, date)
    }
}

impl AccrualBasis for DayCountConvention {
    fn name(&self) -> &'static str {
        match self {
            Self::Act360 => "ACT/360",
            Self::Act365Fixed => "ACT/365F",
        }
    }

    fn accrual(&self, start: f64, end: f64) -> f64 {
        (end - start) * TIME_AXIS_DAYS / self.days_per_year()
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(AccrualBasis::name(self))
    }
}

impl FromStr for DayCountConvention {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(['_', ' '], "/").as_str() {
            "ACT/360" | "ACT360" | "A/360" => Ok(Self::Act360),
            "ACT/365F" | "ACT/365/FIXED" | "ACT365FIXED" | "ACT/365" | "A/365F" => {
                Ok(Self::Act365Fixed)
            }
            _ => Err(CurveError::invalid_input(format!(
                "unknown day count convention: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_fraction() {
        let start = date(2025, 1, 15);
        let end = date(2025, 7, 15);
        // 181 days
        assert_relative_eq!(
            DayCountConvention::Act360.year_fraction(start, end),
            181.0 / 360.0
        );
        assert_relative_eq!(
            DayCountConvention::Act365Fixed.year_fraction(start, end),
            181.0 / 365.0
        );
        assert!(DayCountConvention::Act360.year_fraction(end, start) < 0.0);
    }

    #[test]
    fn test_time_between_ignores_leap_years() {
        let t = DayCountConvention::time_between(date(2024, 1, 1), date(2025, 1, 1));
        assert_relative_eq!(t, 366.0 / 365.0);
    }

    #[test]
    fn test_accrual_rescales_time_axis() {
        assert_relative_eq!(TimeDifference.accrual(0.25, 1.0), 0.75);
        assert_relative_eq!(DayCountConvention::Act365Fixed.accrual(0.25, 1.0), 0.75);
        assert_relative_eq!(
            DayCountConvention::Act360.accrual(0.0, 1.0),
            365.0 / 360.0
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "ACT/360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Act360
        );
        assert_eq!(
            "act_365f".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Act365Fixed
        );
        assert!("30/360".parse::<DayCountConvention>().is_err());
        assert_eq!(DayCountConvention::Act360.to_string(), "ACT/360");
    }
}
