//! # Curvecal Curves
//!
//! Curve calibration and sensitivity engine.
//!
//! This crate provides:
//!
//! - **Curves**: [`YieldCurve`] over zero rates or discount factors, with an
//!   optional fixed anchor at t = 0 and analytic node sensitivities
//! - **Instruments**: Cash deposits, FRAs, vanilla swaps and fixed-coupon bonds
//!   with resolved schedules
//! - **Pricing**: Present value, par rate and sensitivity-pair calculators
//!   dispatched through [`pricing::InstrumentVisitor`]
//! - **Jacobian**: Analytic and finite-difference Jacobians of instrument PVs
//!   with respect to curve nodes
//! - **Calibration**: Newton-Raphson calibration of a curve to market quotes
//! - **Futures**: Bond-future gross basis, net basis and implied repo
//! - **Configuration**: TOML calibration inputs with validation
//!
//! ## Quick Start
//!
//! ```rust
//! use curvecal_curves::prelude::*;
//!
//! let seed = YieldCurve::new(CurveDefinition::new(
//!     vec![0.5, 1.0, 2.0],
//!     vec![0.05, 0.05, 0.05],
//! ))
//! .unwrap();
//!
//! let instruments: Vec<CalibratingInstrument> = vec![
//!     Cash::new(0.0, 0.5, 0.03, 1.0).into(),
//!     Swap::vanilla(0.0, 1.0, Frequency::Annual, Frequency::SemiAnnual, 0.031, 1.0)
//!         .unwrap()
//!         .into(),
//!     Swap::vanilla(0.0, 2.0, Frequency::Annual, Frequency::SemiAnnual, 0.032, 1.0)
//!         .unwrap()
//!         .into(),
//! ];
//!
//! let problem = CalibrationProblem::new(instruments, seed).unwrap();
//! let result = CurveCalibrator::default().calibrate(&problem).unwrap();
//! assert!(result.max_residual() < 1e-10);
//!
//! let df = result.curve.discount_factor(1.5).unwrap();
//! assert!(df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]

pub mod calibration;
pub mod config;
pub mod curve;
pub mod curve_set;
pub mod daycount;
pub mod error;
pub mod futures;
pub mod instruments;
pub mod interpolation;
pub mod jacobian;
mod parallel;
pub mod pricing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calibration::{CalibrationProblem, CalibrationResult, CurveCalibrator};
    pub use crate::config::{
        CalibrationInput, CalibrationSettings, CurveSettings, InstrumentQuote, JacobianMode,
        RootFinderSettings, Validate, ValidationError,
    };
    pub use crate::curve::{CurveDefinition, CurveValueType, YieldCurve};
    pub use crate::curve_set::{CurveRole, CurveSet};
    pub use crate::daycount::{AccrualBasis, DayCountConvention, TimeDifference};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::futures::{
        BondFuture, BondFutureCalculator, DeliverableAnalytics, DeliverableQuote,
    };
    pub use crate::instruments::{
        Bond, CalibratingInstrument, Cash, Fra, Frequency, InstrumentKind, Schedule, Swap,
    };
    pub use crate::interpolation::InterpolationMethod;
    pub use crate::jacobian::{
        AnalyticJacobian, FiniteDifferenceJacobian, InstrumentIndex, Jacobian,
        JacobianCalculator, NodeIndex,
    };
    pub use crate::pricing::{
        implied_flat_rate, InstrumentSensitivities, InstrumentVisitor, ParRateCalculator,
        PresentValueCalculator, SensitivityPair,
    };
    pub use curvecal_math::extrapolation::ExtrapolationMethod;
}

pub use curve::{CurveDefinition, CurveValueType, YieldCurve};
pub use error::{CurveError, CurveResult};
