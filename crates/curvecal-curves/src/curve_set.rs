//! Curves an instrument is priced against.

use serde::{Deserialize, Serialize};

use crate::curve::YieldCurve;

/// The role a curve plays when pricing an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveRole {
    /// Discounts cashflows.
    Funding,
    /// Projects floating-rate fixings.
    Forward,
}

/// The pair of curves an instrument is priced against.
#[derive(Debug, Clone, Copy)]
pub struct CurveSet<'a> {
    funding: &'a YieldCurve,
    forward: &'a YieldCurve,
}

impl<'a> CurveSet<'a> {
    /// Creates a curve set with distinct funding and forward curves.
    #[must_use]
    pub fn new(funding: &'a YieldCurve, forward: &'a YieldCurve) -> Self {
        Self { funding, forward }
    }

    /// Uses one curve for both roles.
    #[must_use]
    pub fn single(curve: &'a YieldCurve) -> Self {
        Self {
            funding: curve,
            forward: curve,
        }
    }

    /// The discounting curve.
    #[must_use]
    pub fn funding(&self) -> &'a YieldCurve {
        self.funding
    }

    /// The projection curve.
    #[must_use]
    pub fn forward(&self) -> &'a YieldCurve {
        self.forward
    }

    /// The curve for a role.
    #[must_use]
    pub fn curve(&self, role: CurveRole) -> &'a YieldCurve {
        match role {
            CurveRole::Funding => self.funding,
            CurveRole::Forward => self.forward,
        }
    }

    /// True when both roles share one curve.
    #[must_use]
    pub fn is_single(&self) -> bool {
        std::ptr::eq(self.funding, self.forward)
    }
}
