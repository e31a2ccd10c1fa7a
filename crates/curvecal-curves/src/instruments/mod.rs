//! Calibrating instruments.
//!
//! Each instrument carries its fully resolved schedule (times and year
//! fractions), notional and market quote, and is immutable once built.
//! [`CalibratingInstrument`] is the closed set of kinds the calibrator
//! understands; calculators dispatch on it through
//! [`crate::pricing::InstrumentVisitor`].

mod bond;
mod cash;
mod fra;
pub mod schedule;
mod swap;

pub use bond::Bond;
pub use cash::Cash;
pub use fra::Fra;
pub use schedule::{Frequency, Period, Schedule};
pub use swap::{FixedLeg, FloatingLeg, Swap};

use serde::{Deserialize, Serialize};

use crate::curve_set::CurveSet;
use crate::error::{CurveError, CurveResult};
use crate::pricing::InstrumentVisitor;

/// Instrument kinds, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Cash deposit.
    Cash,
    /// Forward rate agreement.
    Fra,
    /// Interest rate swap.
    Swap,
    /// Fixed-coupon bond.
    Bond,
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cash => "Cash",
            Self::Fra => "FRA",
            Self::Swap => "Swap",
            Self::Bond => "Bond",
        };
        write!(f, "{name}")
    }
}

/// An instrument whose quote pins down one curve node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalibratingInstrument {
    /// Cash deposit.
    Cash(Cash),
    /// Forward rate agreement.
    Fra(Fra),
    /// Interest rate swap.
    Swap(Swap),
    /// Fixed-coupon bond.
    Bond(Bond),
}

impl CalibratingInstrument {
    /// Dispatches to the visitor method for this kind.
    pub fn accept<V>(&self, visitor: &V, curves: &CurveSet<'_>) -> CurveResult<V::Output>
    where
        V: InstrumentVisitor + ?Sized,
    {
        match self {
            Self::Cash(cash) => visitor.visit_cash(cash, curves),
            Self::Fra(fra) => visitor.visit_fra(fra, curves),
            Self::Swap(swap) => visitor.visit_swap(swap, curves),
            Self::Bond(bond) => visitor.visit_bond(bond, curves),
        }
    }

    /// The instrument kind.
    #[must_use]
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::Cash(_) => InstrumentKind::Cash,
            Self::Fra(_) => InstrumentKind::Fra,
            Self::Swap(_) => InstrumentKind::Swap,
            Self::Bond(_) => InstrumentKind::Bond,
        }
    }

    /// Last time the instrument depends on.
    #[must_use]
    pub fn maturity(&self) -> f64 {
        match self {
            Self::Cash(cash) => cash.end,
            Self::Fra(fra) => fra.fixing_end.max(fra.payment_time),
            Self::Swap(swap) => swap.maturity(),
            Self::Bond(bond) => bond.maturity,
        }
    }

    /// Notional.
    #[must_use]
    pub fn notional(&self) -> f64 {
        match self {
            Self::Cash(cash) => cash.notional,
            Self::Fra(fra) => fra.notional,
            Self::Swap(swap) => swap.notional,
            Self::Bond(bond) => bond.notional,
        }
    }

    /// Market quote: cash rate, FRA strike, swap fixed rate or bond dirty price.
    #[must_use]
    pub fn quote(&self) -> f64 {
        match self {
            Self::Cash(cash) => cash.rate,
            Self::Fra(fra) => fra.strike,
            Self::Swap(swap) => swap.fixed_rate,
            Self::Bond(bond) => bond.dirty_price,
        }
    }

    /// Returns a copy with a different market quote.
    #[must_use]
    pub fn with_quote(&self, quote: f64) -> Self {
        let mut instrument = self.clone();
        match &mut instrument {
            Self::Cash(cash) => cash.rate = quote,
            Self::Fra(fra) => fra.strike = quote,
            Self::Swap(swap) => swap.fixed_rate = quote,
            Self::Bond(bond) => bond.dirty_price = quote,
        }
        instrument
    }

    /// Whether the PV depends on the forward curve of a [`CurveSet`].
    ///
    /// Cash and bonds are priced on the funding curve alone.
    #[must_use]
    pub fn depends_on_forward_curve(&self) -> bool {
        matches!(self, Self::Fra(_) | Self::Swap(_))
    }

    /// Checks schedules, notional and quote.
    pub fn validate(&self) -> CurveResult<()> {
        match self {
            Self::Cash(cash) => cash.validate(),
            Self::Fra(fra) => fra.validate(),
            Self::Swap(swap) => swap.validate(),
            Self::Bond(bond) => bond.validate(),
        }
    }
}

impl From<Cash> for CalibratingInstrument {
    fn from(cash: Cash) -> Self {
        Self::Cash(cash)
    }
}

impl From<Fra> for CalibratingInstrument {
    fn from(fra: Fra) -> Self {
        Self::Fra(fra)
    }
}

impl From<Swap> for CalibratingInstrument {
    fn from(swap: Swap) -> Self {
        Self::Swap(swap)
    }
}

impl From<Bond> for CalibratingInstrument {
    fn from(bond: Bond) -> Self {
        Self::Bond(bond)
    }
}

pub(crate) fn check_finite(name: &str, value: f64) -> CurveResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CurveError::invalid_value(format!("{name} is not finite: {value}")))
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> CurveResult<()> {
    check_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CurveError::invalid_input(format!("{name} must be positive, got {value}")))
    }
}

pub(crate) fn check_time(name: &str, value: f64) -> CurveResult<()> {
    check_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(CurveError::invalid_input(format!("{name} must be non-negative, got {value}")))
    }
}

/// Finite, non-negative and strictly increasing.
pub(crate) fn check_times(name: &str, values: &[f64]) -> CurveResult<()> {
    for (i, value) in values.iter().enumerate() {
        check_time(name, *value)?;
        if i > 0 && *value <= values[i - 1] {
            return Err(CurveError::NonMonotonicTenors {
                index: i,
                prev: values[i - 1],
                current: *value,
            });
        }
    }
    Ok(())
}
