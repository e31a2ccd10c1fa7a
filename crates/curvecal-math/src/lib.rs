//! # Curvecal Math
//!
//! Numerical building blocks for the Curvecal calibration engine.
//!
//! This crate provides:
//!
//! - **Solvers**: Root bracketing and bracketed root-finding (Brent, Bisection)
//! - **Interpolation**: One-dimensional interpolators that also report the
//!   analytic sensitivity of every interpolated value to each node value
//! - **Extrapolation**: Explicit boundary policies with their own sensitivities
//! - **Linear Algebra**: LU decomposition with partial pivoting and singularity
//!   detection, tridiagonal solves
//!
//! ## Design Philosophy
//!
//! - **Analytic sensitivities**: Node sensitivities come from the interpolation
//!   basis, never from bumping
//! - **Stateless solvers**: Every solver is a small `Copy` value carrying its own
//!   configuration, so concurrent calibrations never share mutable state
//! - **Typed failures**: Bracketing, convergence and singular-matrix failures are
//!   distinct error variants

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
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]

pub mod error;
pub mod extrapolation;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::extrapolation::ExtrapolationMethod;
    pub use crate::interpolation::{
        FlatForwardInterpolator, Interpolator, LinearInterpolator, LogLinearInterpolator,
        NaturalCubicSpline,
    };
    pub use crate::linear_algebra::{solve_linear_system, LuDecomposition};
    pub use crate::solvers::{
        bisection, brent, BisectionSolver, BracketRoot, BrentSolver, SingleRootFinder,
        SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};
