//! Calibration configuration.
//!
//! Settings are plain serde structs with field-level defaults, so a TOML file
//! only needs to name what differs from the defaults:
//!
//! ```toml
//! [calibration]
//! tolerance = 1e-10
//! max_iterations = 20
//!
//! [curve]
//! node_times = [0.5, 1.0, 2.0]
//! seed = 0.05
//! anchor = 0.03
//! interpolation = "Linear"
//!
//! [[instruments]]
//! type = "cash"
//! end = 0.5
//! rate = 0.0302
//!
//! [[instruments]]
//! type = "swap"
//! maturity = 1.0
//! fixed_rate = 0.0303
//! ```
//!
//! Every settings type implements [`Validate`]; [`CalibrationInput::from_toml_str`]
//! validates eagerly.

use std::path::Path;

use curvecal_math::extrapolation::ExtrapolationMethod;
use curvecal_math::solvers::{BracketRoot, BrentSolver, SingleRootFinder, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calibration::CalibrationProblem;
use crate::curve::{CurveDefinition, CurveValueType, YieldCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::{Bond, CalibratingInstrument, Cash, Fra, Frequency, Swap};
use crate::interpolation::InterpolationMethod;

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }

    fn nested(self, prefix: &str) -> Self {
        Self {
            field: format!("{prefix}.{}", self.field),
            ..self
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns an error if invalid.
    fn validate_or_error(&self) -> CurveResult<()> {
        let mut errors = self.validate();
        match errors.len() {
            0 => Ok(()),
            1 => {
                let err = errors.remove(0);
                Err(CurveError::Validation {
                    field: err.field,
                    message: err.message,
                })
            }
            _ => Err(CurveError::MultipleValidationErrors(errors)),
        }
    }
}

// =============================================================================
// Calibration settings
// =============================================================================

/// How the calibrator obtains the Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JacobianMode {
    /// Discount-factor sensitivities chained with interpolation sensitivities.
    #[default]
    Analytic,
    /// Central differences on node bumps.
    FiniteDifference,
}

/// Newton calibration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Convergence threshold on the largest absolute residual (PV units).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum Newton steps.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Pivot threshold, relative to the largest Jacobian entry.
    #[serde(default = "default_pivot_threshold")]
    pub pivot_threshold: f64,

    /// Jacobian implementation.
    #[serde(default)]
    pub jacobian: JacobianMode,

    /// Node bump for [`JacobianMode::FiniteDifference`].
    #[serde(default = "default_bump")]
    pub finite_difference_bump: f64,

    /// Price and differentiate instruments in parallel (needs the `parallel` feature).
    #[serde(default)]
    pub parallel: bool,
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> u32 {
    50
}

fn default_pivot_threshold() -> f64 {
    curvecal_math::linear_algebra::DEFAULT_PIVOT_THRESHOLD
}

fn default_bump() -> f64 {
    1e-6
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            pivot_threshold: default_pivot_threshold(),
            jacobian: JacobianMode::default(),
            finite_difference_bump: default_bump(),
            parallel: false,
        }
    }
}

impl CalibrationSettings {
    /// Sets the residual tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the Jacobian implementation.
    #[must_use]
    pub fn with_jacobian(mut self, jacobian: JacobianMode) -> Self {
        self.jacobian = jacobian;
        self
    }

    /// Enables or disables parallel evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Validate for CalibrationSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            errors.push(ValidationError::with_rule(
                "tolerance",
                "Tolerance must be positive",
                "valid_tolerance",
            ));
        }

        if self.max_iterations == 0 || self.max_iterations > 10_000 {
            errors.push(ValidationError::with_rule(
                "max_iterations",
                "Max iterations must be between 1 and 10000",
                "valid_iterations",
            ));
        }

        if !(self.pivot_threshold > 0.0 && self.pivot_threshold < 1.0) {
            errors.push(ValidationError::with_rule(
                "pivot_threshold",
                "Pivot threshold must be in (0, 1)",
                "valid_pivot_threshold",
            ));
        }

        if !(self.finite_difference_bump.is_finite() && self.finite_difference_bump > 0.0) {
            errors.push(ValidationError::new(
                "finite_difference_bump",
                "Bump must be positive",
            ));
        }

        errors
    }
}

// =============================================================================
// Root finder settings
// =============================================================================

/// Settings for scalar root searches (implied rates, implied repo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootFinderSettings {
    /// Absolute tolerance on `|f(x)|` at the returned root.
    #[serde(default = "default_root_tolerance")]
    pub tolerance: f64,

    /// Maximum Brent iterations.
    #[serde(default = "default_root_iterations")]
    pub max_iterations: u32,

    /// Bracket expansion factor.
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,

    /// Maximum bracket expansions.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial bracket guess.
    #[serde(default = "default_initial_bracket")]
    pub initial_bracket: (f64, f64),
}

fn default_root_tolerance() -> f64 {
    1e-12
}

fn default_root_iterations() -> u32 {
    100
}

fn default_growth_factor() -> f64 {
    1.6
}

fn default_max_attempts() -> u32 {
    50
}

fn default_initial_bracket() -> (f64, f64) {
    (0.0, 0.1)
}

impl Default for RootFinderSettings {
    fn default() -> Self {
        Self {
            tolerance: default_root_tolerance(),
            max_iterations: default_root_iterations(),
            growth_factor: default_growth_factor(),
            max_attempts: default_max_attempts(),
            initial_bracket: default_initial_bracket(),
        }
    }
}

impl RootFinderSettings {
    /// Sets the initial bracket guess.
    #[must_use]
    pub fn with_initial_bracket(mut self, lo: f64, hi: f64) -> Self {
        self.initial_bracket = (lo, hi);
        self
    }

    /// The Brent solver described by these settings.
    #[must_use]
    pub fn solver(&self) -> BrentSolver {
        BrentSolver::new(SolverConfig::new(self.tolerance, self.max_iterations))
    }

    /// The bracketer described by these settings.
    #[must_use]
    pub fn bracketer(&self) -> BracketRoot {
        BracketRoot::new(self.growth_factor, self.max_attempts)
    }

    /// Brackets from the initial guess, then solves with Brent.
    pub fn solve<F>(&self, f: F) -> CurveResult<f64>
    where
        F: Fn(f64) -> f64,
    {
        let (guess_lo, guess_hi) = self.initial_bracket;
        let (lo, hi) = self.bracketer().bracket(&f, guess_lo, guess_hi)?;
        trace!(lo, hi, "bracketed root");
        let result = self.solver().find_root(&f, lo, hi)?;
        Ok(result.root)
    }
}

impl Validate for RootFinderSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            errors.push(ValidationError::new("tolerance", "Tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            errors.push(ValidationError::new("max_iterations", "Max iterations must be positive"));
        }
        if !(self.growth_factor.is_finite() && self.growth_factor > 0.0) {
            errors.push(ValidationError::new("growth_factor", "Growth factor must be positive"));
        }
        let (lo, hi) = self.initial_bracket;
        if !(lo.is_finite() && hi.is_finite()) || lo == hi {
            errors.push(ValidationError::new(
                "initial_bracket",
                "Initial bracket must be two distinct finite values",
            ));
        }
        errors
    }
}

// =============================================================================
// Curve settings
// =============================================================================

/// Layout and seed of the curve to calibrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSettings {
    /// Free node times in years.
    pub node_times: Vec<f64>,

    /// Seed value for every node when `seed_values` is absent.
    #[serde(default = "default_seed")]
    pub seed: f64,

    /// Per-node seed values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_values: Option<Vec<f64>>,

    /// Node representation.
    #[serde(default)]
    pub value_type: CurveValueType,

    /// Interpolation method.
    #[serde(default)]
    pub interpolation: InterpolationMethod,

    /// Extrapolation policy.
    #[serde(default)]
    pub extrapolation: ExtrapolationMethod,

    /// Fixed value at `t = 0` (spot rate, or 1.0 for discount factors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<f64>,
}

fn default_seed() -> f64 {
    0.05
}

impl CurveSettings {
    /// Creates settings for the given node times with default seeds and methods.
    #[must_use]
    pub fn new(node_times: Vec<f64>) -> Self {
        Self {
            node_times,
            seed: default_seed(),
            seed_values: None,
            value_type: CurveValueType::default(),
            interpolation: InterpolationMethod::default(),
            extrapolation: ExtrapolationMethod::default(),
            anchor: None,
        }
    }

    /// Builds the seed curve.
    pub fn seed_curve(&self) -> CurveResult<YieldCurve> {
        let values = self
            .seed_values
            .clone()
            .unwrap_or_else(|| vec![self.seed; self.node_times.len()]);
        YieldCurve::new(CurveDefinition {
            times: self.node_times.clone(),
            values,
            value_type: self.value_type,
            interpolation: self.interpolation,
            extrapolation: self.extrapolation,
            anchor: self.anchor,
        })
    }
}

impl Validate for CurveSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.node_times.is_empty() {
            errors.push(ValidationError::new("node_times", "At least one node is required"));
        }
        if self.node_times.iter().any(|t| !(t.is_finite() && *t > 0.0)) {
            errors.push(ValidationError::with_rule(
                "node_times",
                "Node times must be positive",
                "positive_times",
            ));
        }
        if self.node_times.windows(2).any(|w| w[1] <= w[0]) {
            errors.push(ValidationError::with_rule(
                "node_times",
                "Node times must be strictly increasing",
                "increasing_times",
            ));
        }
        if let Some(values) = &self.seed_values {
            if values.len() != self.node_times.len() {
                errors.push(ValidationError::new(
                    "seed_values",
                    format!(
                        "Expected {} seed values, got {}",
                        self.node_times.len(),
                        values.len()
                    ),
                ));
            }
            if values.iter().any(|v| !v.is_finite()) {
                errors.push(ValidationError::new("seed_values", "Seed values must be finite"));
            }
        } else if !self.seed.is_finite() {
            errors.push(ValidationError::new("seed", "Seed must be finite"));
        }
        if self.value_type == CurveValueType::DiscountFactor && self.anchor.is_none() {
            errors.push(ValidationError::with_rule(
                "anchor",
                "Discount-factor curves need an anchor (usually 1.0)",
                "discount_anchor",
            ));
        }
        errors
    }
}

// =============================================================================
// Instrument quotes
// =============================================================================

/// A market quote for a calibrating instrument, with schedule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstrumentQuote {
    /// Cash deposit.
    Cash {
        /// Start time.
        #[serde(default)]
        start: f64,
        /// End time.
        end: f64,
        /// Simple rate.
        rate: f64,
        /// Notional.
        #[serde(default = "default_notional")]
        notional: f64,
    },
    /// Forward rate agreement.
    Fra {
        /// Fixing start.
        start: f64,
        /// Fixing end.
        end: f64,
        /// Contract rate.
        rate: f64,
        /// Notional.
        #[serde(default = "default_notional")]
        notional: f64,
    },
    /// Vanilla fixed-for-floating swap.
    Swap {
        /// Start time.
        #[serde(default)]
        start: f64,
        /// Maturity.
        maturity: f64,
        /// Fixed rate.
        fixed_rate: f64,
        /// Fixed leg frequency.
        #[serde(default)]
        fixed_frequency: Frequency,
        /// Floating leg frequency.
        #[serde(default = "default_floating_frequency")]
        floating_frequency: Frequency,
        /// Floating spread.
        #[serde(default)]
        spread: f64,
        /// Notional.
        #[serde(default = "default_notional")]
        notional: f64,
    },
    /// Fixed-coupon bond.
    Bond {
        /// Maturity.
        maturity: f64,
        /// Annual coupon rate.
        coupon: f64,
        /// Coupon frequency.
        #[serde(default)]
        frequency: Frequency,
        /// Dirty price per unit notional.
        dirty_price: f64,
        /// Notional.
        #[serde(default = "default_notional")]
        notional: f64,
    },
}

fn default_notional() -> f64 {
    1.0
}

fn default_floating_frequency() -> Frequency {
    Frequency::Quarterly
}

impl InstrumentQuote {
    /// Builds and validates the calibrating instrument.
    pub fn to_instrument(&self) -> CurveResult<CalibratingInstrument> {
        let instrument: CalibratingInstrument = match *self {
            Self::Cash {
                start,
                end,
                rate,
                notional,
            } => Cash::new(start, end, rate, notional).into(),
            Self::Fra {
                start,
                end,
                rate,
                notional,
            } => Fra::new(start, end, rate, notional).into(),
            Self::Swap {
                start,
                maturity,
                fixed_rate,
                fixed_frequency,
                floating_frequency,
                spread,
                notional,
            } => Swap::vanilla(
                start,
                maturity,
                fixed_frequency,
                floating_frequency,
                fixed_rate,
                notional,
            )?
            .with_spread(spread)
            .into(),
            Self::Bond {
                maturity,
                coupon,
                frequency,
                dirty_price,
                notional,
            } => Bond::fixed_coupon(coupon, maturity, frequency, notional, dirty_price)?.into(),
        };
        instrument.validate()?;
        Ok(instrument)
    }
}

impl Validate for InstrumentQuote {
    fn validate(&self) -> Vec<ValidationError> {
        match self.to_instrument() {
            Ok(_) => Vec::new(),
            Err(err) => vec![ValidationError::new("quote", err.to_string())],
        }
    }
}

// =============================================================================
// Calibration input
// =============================================================================

/// A complete calibration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    /// Newton settings.
    #[serde(default)]
    pub calibration: CalibrationSettings,

    /// Root finder settings for implied-rate reporting.
    #[serde(default)]
    pub root_finder: RootFinderSettings,

    /// Curve layout and seed.
    pub curve: CurveSettings,

    /// Calibrating instruments, one per node.
    pub instruments: Vec<InstrumentQuote>,
}

impl CalibrationInput {
    /// Parses and validates TOML.
    pub fn from_toml_str(input: &str) -> CurveResult<Self> {
        let parsed: Self = toml::from_str(input)?;
        parsed.validate_or_error()?;
        Ok(parsed)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> CurveResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> CurveResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builds the calibration problem.
    pub fn problem(&self) -> CurveResult<CalibrationProblem> {
        let instruments = self
            .instruments
            .iter()
            .map(InstrumentQuote::to_instrument)
            .collect::<CurveResult<Vec<_>>>()?;
        CalibrationProblem::new(instruments, self.curve.seed_curve()?)
    }
}

impl Validate for CalibrationInput {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self
            .calibration
            .validate()
            .into_iter()
            .map(|e| e.nested("calibration"))
            .chain(self.root_finder.validate().into_iter().map(|e| e.nested("root_finder")))
            .chain(self.curve.validate().into_iter().map(|e| e.nested("curve")))
            .collect();

        for (i, quote) in self.instruments.iter().enumerate() {
            for error in quote.validate() {
                errors.push(error.nested(&format!("instruments[{i}]")));
            }
        }

        if self.instruments.len() != self.curve.node_times.len() {
            errors.push(ValidationError::with_rule(
                "instruments",
                format!(
                    "Need one instrument per node: {} instruments, {} nodes",
                    self.instruments.len(),
                    self.curve.node_times.len()
                ),
                "square_system",
            ));
        }
        errors
    }
}
