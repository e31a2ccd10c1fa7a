//! Scalar root finding.
//!
//! This module provides the single-unknown solvers used for implied-rate style
//! inversions (implied repo rates, implied flat rates):
//!
//! - [`BracketRoot`]: expands a pair of initial guesses until the function
//!   changes sign across them
//! - [`brent`]: inverse quadratic / secant steps with a bisection fallback
//! - [`bisection`]: slow but unconditionally convergent halving
//!
//! # Choosing a Solver
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Brent | Fast (superlinear) | Guaranteed | Bracket |
//! | Bisection | Slow (linear) | Guaranteed | Bracket |
//!
//! Solvers are plain values carrying their [`SolverConfig`]. Nothing in this
//! module keeps static state, so independent inversions (one per deliverable
//! bond in a futures basket, say) can run on separate threads.
//!
//! # Example
//!
//! ```rust
//! use curvecal_math::solvers::{BracketRoot, BrentSolver, SingleRootFinder};
//!
//! // Continuously compounded rate that discounts 100 to 90 over 2 years
//! let f = |r: f64| 100.0 * (-r * 2.0).exp() - 90.0;
//!
//! let (lo, hi) = BracketRoot::default().bracket(f, 0.0, 0.01).unwrap();
//! let result = BrentSolver::default().find_root(f, lo, hi).unwrap();
//! assert!((result.root - (100.0_f64 / 90.0).ln() / 2.0).abs() < 1e-10);
//! ```

mod bisection;
mod bracket;
mod brent;

pub use bisection::bisection;
pub use bracket::BracketRoot;
pub use brent::brent;

use crate::error::MathResult;

/// Default tolerance on the function value for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence is reached once `|f(x)|` falls below this value.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

impl SolverResult {
    pub(crate) fn at(root: f64, iterations: u32, residual: f64) -> Self {
        Self {
            root,
            iterations,
            residual,
        }
    }
}

/// A solver for a single real root inside a known bracket.
///
/// Implementations are stateless apart from their configuration, so a single
/// value can be shared freely between threads.
pub trait SingleRootFinder: Send + Sync {
    /// Finds a root of `f` inside `[lo, hi]`.
    ///
    /// `f(lo)` and `f(hi)` must not have the same sign.
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> MathResult<SolverResult>
    where
        F: Fn(f64) -> f64;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}

/// Brent's method as a [`SingleRootFinder`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrentSolver {
    /// Solver configuration.
    pub config: SolverConfig,
}

impl BrentSolver {
    /// Creates a Brent solver with the given configuration.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl SingleRootFinder for BrentSolver {
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> MathResult<SolverResult>
    where
        F: Fn(f64) -> f64,
    {
        brent(f, lo, hi, &self.config)
    }

    fn name(&self) -> &'static str {
        "Brent"
    }
}

/// Bisection as a [`SingleRootFinder`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BisectionSolver {
    /// Solver configuration.
    pub config: SolverConfig,
}

impl BisectionSolver {
    /// Creates a bisection solver with the given configuration.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl SingleRootFinder for BisectionSolver {
    fn find_root<F>(&self, f: F, lo: f64, hi: f64) -> MathResult<SolverResult>
    where
        F: Fn(f64) -> f64,
    {
        bisection(f, lo, hi, &self.config)
    }

    fn name(&self) -> &'static str {
        "Bisection"
    }
}
