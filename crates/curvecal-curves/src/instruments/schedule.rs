//! Payment frequencies and regular schedules on the year-fraction axis.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Times closer than this are treated as equal when rolling schedules.
const TIME_EPSILON: f64 = 1e-9;

/// Payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Once a year.
    Annual,
    /// Twice a year.
    #[default]
    SemiAnnual,
    /// Four times a year.
    Quarterly,
    /// Twelve times a year.
    Monthly,
}

impl Frequency {
    /// Number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Annual => 1,
            Self::SemiAnnual => 2,
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }

    /// Length of one regular period in years.
    #[must_use]
    pub fn period_length(&self) -> f64 {
        1.0 / f64::from(self.periods_per_year())
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Annual => "Annual",
            Self::SemiAnnual => "Semi-Annual",
            Self::Quarterly => "Quarterly",
            Self::Monthly => "Monthly",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Frequency {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "annual" | "1y" | "12m" => Ok(Self::Annual),
            "semiannual" | "6m" => Ok(Self::SemiAnnual),
            "quarterly" | "3m" => Ok(Self::Quarterly),
            "monthly" | "1m" => Ok(Self::Monthly),
            _ => Err(CurveError::invalid_input(format!("unknown frequency: {s}"))),
        }
    }
}

/// One accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Accrual start time.
    pub start: f64,
    /// Accrual end (and payment) time.
    pub end: f64,
    /// Accrual year fraction.
    pub accrual: f64,
}

/// A sequence of contiguous accrual periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    periods: Vec<Period>,
}

impl Schedule {
    /// Rolls a regular schedule backwards from `maturity`, leaving any short stub first.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is negative or not before `maturity`.
    pub fn regular(start: f64, maturity: f64, frequency: Frequency) -> CurveResult<Self> {
        if !start.is_finite() || !maturity.is_finite() || start < 0.0 {
            return Err(CurveError::invalid_input(format!(
                "schedule bounds must be finite and non-negative: [{start}, {maturity}]"
            )));
        }
        if maturity <= start + TIME_EPSILON {
            return Err(CurveError::invalid_input(format!(
                "schedule maturity {maturity} must be after start {start}"
            )));
        }

        let step = frequency.period_length();
        let mut periods = Vec::new();
        let mut k = 0_u32;
        loop {
            let end = maturity - f64::from(k) * step;
            let begin = maturity - f64::from(k + 1) * step;
            if begin <= start + TIME_EPSILON {
                periods.push(Period {
                    start,
                    end,
                    accrual: end - start,
                });
                break;
            }
            periods.push(Period {
                start: begin,
                end,
                accrual: end - begin,
            });
            k += 1;
        }
        periods.reverse();
        Ok(Self { periods })
    }

    /// The accrual periods in time order.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True if the schedule has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Period end times.
    #[must_use]
    pub fn payment_times(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.end).collect()
    }

    /// Accrual year fractions.
    #[must_use]
    pub fn accruals(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.accrual).collect()
    }
}
