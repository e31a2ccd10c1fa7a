//! Root bracketing by geometric expansion.

use tracing::trace;

use crate::error::{MathError, MathResult};

/// Default growth factor applied to the interval on each expansion.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.6;

/// Default number of expansions before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Searches outward from two initial guesses for a sign change.
///
/// On each step the end whose function value is smaller in magnitude is
/// pushed away from the other end by `growth_factor` times the current width,
/// the classic `zbrac` rule. The resulting interval can be handed to any
/// [`SingleRootFinder`](crate::solvers::SingleRootFinder).
///
/// # Example
///
/// ```rust
/// use curvecal_math::solvers::BracketRoot;
///
/// let f = |x: f64| x - 10.0;
/// let (lo, hi) = BracketRoot::default().bracket(f, 0.0, 1.0).unwrap();
/// assert!(f(lo) * f(hi) <= 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketRoot {
    /// Multiple of the current width added on each expansion.
    pub growth_factor: f64,
    /// Maximum number of expansions.
    pub max_attempts: u32,
}

impl Default for BracketRoot {
    fn default() -> Self {
        Self {
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BracketRoot {
    /// Creates a bracketer with explicit growth and attempt limits.
    #[must_use]
    pub fn new(growth_factor: f64, max_attempts: u32) -> Self {
        Self {
            growth_factor,
            max_attempts,
        }
    }

    /// Returns `(lo, hi)` with `lo < hi` and `f(lo) * f(hi) <= 0`.
    ///
    /// # Errors
    ///
    /// - [`MathError::InvalidInput`] if the guesses coincide, are not finite,
    ///   or the growth factor is not positive
    /// - [`MathError::BracketingFailed`] if no sign change is found within
    ///   `max_attempts` expansions
    pub fn bracket<F>(&self, f: F, guess_lo: f64, guess_hi: f64) -> MathResult<(f64, f64)>
    where
        F: Fn(f64) -> f64,
    {
        if !guess_lo.is_finite() || !guess_hi.is_finite() {
            return Err(MathError::invalid_input(format!(
                "initial guesses must be finite: ({guess_lo}, {guess_hi})"
            )));
        }
        #[allow(clippy::float_cmp)]
        if guess_lo == guess_hi {
            return Err(MathError::invalid_input(format!(
                "initial guesses must differ to form a bracket: both are {guess_lo}"
            )));
        }
        if self.growth_factor <= 0.0 || !self.growth_factor.is_finite() {
            return Err(MathError::invalid_input(format!(
                "growth factor must be positive, got {}",
                self.growth_factor
            )));
        }

        let mut x1 = guess_lo.min(guess_hi);
        let mut x2 = guess_lo.max(guess_hi);
        let mut f1 = f(x1);
        let mut f2 = f(x2);

        for attempt in 0..=self.max_attempts {
            if f1 * f2 <= 0.0 {
                trace!(attempt, lo = x1, hi = x2, "root bracketed");
                return Ok((x1, x2));
            }
            if attempt == self.max_attempts {
                break;
            }
            if f1.abs() < f2.abs() {
                x1 += self.growth_factor * (x1 - x2);
                f1 = f(x1);
            } else {
                x2 += self.growth_factor * (x2 - x1);
                f2 = f(x2);
            }
        }

        Err(MathError::BracketingFailed {
            lo: x1,
            hi: x2,
            attempts: self.max_attempts,
        })
    }
}
