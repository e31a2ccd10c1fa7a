//! Interpolated yield curve.
//!
//! A [`YieldCurve`] is an immutable set of nodes (time, value) together with
//! the interpolator built from them. Node values are either continuously
//! compounded zero rates or discount factors ([`CurveValueType`]). A curve may
//! carry an anchor at `t = 0` that takes part in interpolation but is not a
//! calibration degree of freedom: node indices, values and sensitivities
//! reported by the curve always refer to the free nodes only.

use std::sync::Arc;

use curvecal_math::extrapolation::ExtrapolationMethod;
use curvecal_math::interpolation::Interpolator;
use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationMethod;

/// What a curve's node values represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurveValueType {
    /// Continuously compounded zero rate, `DF(t) = exp(-r(t) * t)`.
    #[default]
    ZeroRate,
    /// Discount factor.
    DiscountFactor,
}

impl std::fmt::Display for CurveValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroRate => write!(f, "Zero Rate"),
            Self::DiscountFactor => write!(f, "Discount Factor"),
        }
    }
}

/// Serializable description of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDefinition {
    /// Free node times in years, strictly increasing.
    pub times: Vec<f64>,
    /// Free node values.
    pub values: Vec<f64>,
    /// Node representation.
    #[serde(default)]
    pub value_type: CurveValueType,
    /// Interpolation between nodes.
    #[serde(default)]
    pub interpolation: InterpolationMethod,
    /// Policy outside the node range.
    #[serde(default)]
    pub extrapolation: ExtrapolationMethod,
    /// Fixed value at `t = 0`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<f64>,
}

impl CurveDefinition {
    /// Creates a definition with default value type, interpolation and extrapolation.
    #[must_use]
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            times,
            values,
            value_type: CurveValueType::default(),
            interpolation: InterpolationMethod::default(),
            extrapolation: ExtrapolationMethod::default(),
            anchor: None,
        }
    }

    /// Sets the node representation.
    #[must_use]
    pub fn with_value_type(mut self, value_type: CurveValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the interpolation method.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the extrapolation policy.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: ExtrapolationMethod) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Sets the fixed value at `t = 0`.
    #[must_use]
    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = Some(anchor);
        self
    }

    fn validate(&self) -> CurveResult<()> {
        if self.times.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }
        if self.times.len() != self.values.len() {
            return Err(CurveError::invalid_input(format!(
                "curve has {} times but {} values",
                self.times.len(),
                self.values.len()
            )));
        }
        for (i, (t, v)) in self.times.iter().zip(self.values.iter()).enumerate() {
            if !t.is_finite() || !v.is_finite() {
                return Err(CurveError::invalid_value(format!(
                    "node {i} is not finite: ({t}, {v})"
                )));
            }
        }
        if self.times[0] < 0.0 {
            return Err(CurveError::invalid_input("node times must be non-negative"));
        }
        for i in 1..self.times.len() {
            if self.times[i] <= self.times[i - 1] {
                return Err(CurveError::NonMonotonicTenors {
                    index: i,
                    prev: self.times[i - 1],
                    current: self.times[i],
                });
            }
        }
        if let Some(anchor) = self.anchor {
            if !anchor.is_finite() {
                return Err(CurveError::invalid_value("anchor is not finite"));
            }
            if self.times[0] <= 0.0 {
                return Err(CurveError::NonMonotonicTenors {
                    index: 0,
                    prev: 0.0,
                    current: self.times[0],
                });
            }
        }
        if self.value_type == CurveValueType::DiscountFactor {
            if self.values.iter().chain(self.anchor.iter()).any(|v| *v <= 0.0) {
                return Err(CurveError::invalid_value(
                    "discount factors must be positive",
                ));
            }
            // Otherwise DF(0) comes from extrapolating the first node.
            if self.anchor.is_none() && self.times[0] > 0.0 {
                return Err(CurveError::invalid_input(
                    "discount-factor curve needs an anchor or a node at t = 0",
                ));
            }
        }
        Ok(())
    }
}

/// An immutable interpolated yield curve.
///
/// ```rust
/// use curvecal_curves::{CurveDefinition, YieldCurve};
///
/// let curve = YieldCurve::new(
///     CurveDefinition::new(vec![1.0, 2.0, 5.0], vec![0.03, 0.032, 0.035]).with_anchor(0.03),
/// )
/// .unwrap();
/// let df = curve.discount_factor(1.5).unwrap();
/// assert!(df < 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CurveDefinition", into = "CurveDefinition")]
pub struct YieldCurve {
    definition: CurveDefinition,
    /// `None` for a one-node curve, which is flat.
    interpolator: Option<Arc<dyn Interpolator>>,
}

impl YieldCurve {
    /// Builds a curve from its definition.
    ///
    /// # Errors
    ///
    /// Returns an error for empty, unsorted or non-finite nodes, for an anchor
    /// combined with a node at `t = 0`, for a discount-factor curve with
    /// neither an anchor nor a node at `t = 0`, or when the interpolator
    /// rejects the node values.
    pub fn new(definition: CurveDefinition) -> CurveResult<Self> {
        definition.validate()?;
        let (xs, ys) = all_nodes(&definition);
        let interpolator = if xs.len() > 1 {
            Some(definition.interpolation.build(xs, ys)?)
        } else {
            None
        };
        Ok(Self {
            definition,
            interpolator,
        })
    }

    /// A flat continuously compounded zero curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not finite.
    pub fn flat(rate: f64) -> CurveResult<Self> {
        Self::new(CurveDefinition::new(vec![1.0], vec![rate]))
    }

    /// Builds a curve with the same layout and new free node values.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values differs or the values are invalid.
    pub fn with_values(&self, values: &[f64]) -> CurveResult<Self> {
        if values.len() != self.node_count() {
            return Err(CurveError::invalid_input(format!(
                "expected {} node values, got {}",
                self.node_count(),
                values.len()
            )));
        }
        Self::new(CurveDefinition {
            values: values.to_vec(),
            ..self.definition.clone()
        })
    }

    /// The curve definition.
    #[must_use]
    pub fn definition(&self) -> &CurveDefinition {
        &self.definition
    }

    /// Free node times.
    #[must_use]
    pub fn node_times(&self) -> &[f64] {
        &self.definition.times
    }

    /// Free node values.
    #[must_use]
    pub fn node_values(&self) -> &[f64] {
        &self.definition.values
    }

    /// Number of free nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.definition.times.len()
    }

    /// Node representation.
    #[must_use]
    pub fn value_type(&self) -> CurveValueType {
        self.definition.value_type
    }

    /// Interpolation method.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.definition.interpolation
    }

    /// Extrapolation policy.
    #[must_use]
    pub fn extrapolation(&self) -> ExtrapolationMethod {
        self.definition.extrapolation
    }

    /// Fixed value at `t = 0`, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<f64> {
        self.definition.anchor
    }

    /// Last node time.
    #[must_use]
    pub fn max_time(&self) -> f64 {
        self.definition.times[self.definition.times.len() - 1]
    }

    /// Node-representation value at t.
    pub fn value_at(&self, t: f64) -> CurveResult<f64> {
        self.check_time(t)?;
        match &self.interpolator {
            None => Ok(self.definition.values[0]),
            Some(interp) => Ok(self.definition.extrapolation.value(interp.as_ref(), t)?),
        }
    }

    /// `∂value_at(t)/∂(free node k)` for every free node.
    pub fn value_sensitivities(&self, t: f64) -> CurveResult<Vec<f64>> {
        self.check_time(t)?;
        match &self.interpolator {
            None => Ok(vec![1.0]),
            Some(interp) => {
                let mut sens = self
                    .definition
                    .extrapolation
                    .node_sensitivities(interp.as_ref(), t)?;
                if self.definition.anchor.is_some() {
                    sens.remove(0);
                }
                Ok(sens)
            }
        }
    }

    /// Discount factor at t.
    pub fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        let value = self.value_at(t)?;
        Ok(match self.definition.value_type {
            CurveValueType::ZeroRate => (-value * t).exp(),
            CurveValueType::DiscountFactor => value,
        })
    }

    /// `∂DF(t)/∂(free node k)` for every free node.
    pub fn discount_factor_sensitivities(&self, t: f64) -> CurveResult<Vec<f64>> {
        let mut sens = self.value_sensitivities(t)?;
        if self.definition.value_type == CurveValueType::ZeroRate {
            let scale = -t * self.discount_factor(t)?;
            for s in &mut sens {
                *s *= scale;
            }
        }
        Ok(sens)
    }

    /// Continuously compounded zero rate at t.
    ///
    /// At `t = 0` a discount-factor curve returns the instantaneous forward rate.
    pub fn zero_rate(&self, t: f64) -> CurveResult<f64> {
        match self.definition.value_type {
            CurveValueType::ZeroRate => self.value_at(t),
            CurveValueType::DiscountFactor => {
                if t <= 0.0 {
                    return self.instantaneous_forward(t);
                }
                let df = self.discount_factor(t)?;
                if df <= 0.0 {
                    return Err(CurveError::invalid_value(format!(
                        "discount factor {df} at t={t} is not positive"
                    )));
                }
                Ok(-df.ln() / t)
            }
        }
    }

    /// Continuously compounded forward rate between t1 and t2.
    pub fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Err(CurveError::invalid_input(format!(
                "forward rate needs t2 > t1, got [{t1}, {t2}]"
            )));
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        if df1 <= 0.0 || df2 <= 0.0 {
            return Err(CurveError::invalid_value(
                "discount factors must be positive for a forward rate",
            ));
        }
        Ok((df1 / df2).ln() / (t2 - t1))
    }

    /// Instantaneous forward rate `-d ln DF(t) / dt`.
    pub fn instantaneous_forward(&self, t: f64) -> CurveResult<f64> {
        let value = self.value_at(t)?;
        let slope = match &self.interpolator {
            None => 0.0,
            Some(interp) => self.definition.extrapolation.derivative(interp.as_ref(), t)?,
        };
        match self.definition.value_type {
            CurveValueType::ZeroRate => Ok(value + t * slope),
            CurveValueType::DiscountFactor => Ok(-slope / value),
        }
    }

    fn check_time(&self, t: f64) -> CurveResult<()> {
        if t.is_nan() {
            return Err(CurveError::invalid_value("time is NaN"));
        }
        if t < 0.0 || t.is_infinite() {
            return Err(CurveError::tenor_out_of_range(t, 0.0, self.max_time()));
        }
        if self.interpolator.is_none() && self.definition.extrapolation == ExtrapolationMethod::None {
            let node = self.definition.times[0];
            if t < node || t > node {
                return Err(CurveError::tenor_out_of_range(t, node, node));
            }
        }
        Ok(())
    }
}

impl TryFrom<CurveDefinition> for YieldCurve {
    type Error = CurveError;

    fn try_from(definition: CurveDefinition) -> CurveResult<Self> {
        Self::new(definition)
    }
}

impl From<YieldCurve> for CurveDefinition {
    fn from(curve: YieldCurve) -> Self {
        curve.definition
    }
}

/// Interpolation nodes including the anchor.
fn all_nodes(definition: &CurveDefinition) -> (Vec<f64>, Vec<f64>) {
    match definition.anchor {
        Some(anchor) => (
            std::iter::once(0.0).chain(definition.times.iter().copied()).collect(),
            std::iter::once(anchor)
                .chain(definition.values.iter().copied())
                .collect(),
        ),
        None => (definition.times.clone(), definition.values.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_zero_curve(method: InterpolationMethod) -> YieldCurve {
        YieldCurve::new(
            CurveDefinition::new(vec![0.5, 1.0, 2.0, 5.0], vec![0.02, 0.025, 0.03, 0.035])
                .with_interpolation(method)
                .with_anchor(0.018),
        )
        .unwrap()
    }

    #[test]
    fn test_flat_curve() {
        let curve = YieldCurve::flat(0.05).unwrap();
        for t in [0.0, 0.25, 1.0, 7.5, 30.0] {
            assert_relative_eq!(curve.discount_factor(t).unwrap(), (-0.05 * t).exp(), epsilon = 1e-15);
        }
        assert_eq!(curve.value_sensitivities(3.0).unwrap(), vec![1.0]);
        assert_relative_eq!(curve.instantaneous_forward(4.0).unwrap(), 0.05, epsilon = 1e-15);
    }

    #[test]
    fn test_anchor_is_not_a_degree_of_freedom() {
        let curve = sample_zero_curve(InterpolationMethod::Linear);
        assert_eq!(curve.node_count(), 4);
        assert_relative_eq!(curve.zero_rate(0.0).unwrap(), 0.018);
        assert_relative_eq!(curve.discount_factor(0.0).unwrap(), 1.0);

        let sens = curve.value_sensitivities(0.25).unwrap();
        assert_eq!(sens.len(), 4);
        assert_relative_eq!(sens[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_discount_factor_sensitivities_match_bumps() {
        let h = 1e-7;
        for method in [
            InterpolationMethod::Linear,
            InterpolationMethod::LogLinear,
            InterpolationMethod::NaturalCubicSpline,
            InterpolationMethod::FlatForward,
        ] {
            let curve = sample_zero_curve(method);
            for t in [0.3, 1.5, 4.0, 7.0] {
                let analytic = curve.discount_factor_sensitivities(t).unwrap();
                for k in 0..curve.node_count() {
                    let mut up = curve.node_values().to_vec();
                    up[k] += h;
                    let mut down = curve.node_values().to_vec();
                    down[k] -= h;
                    let numerical = (curve.with_values(&up).unwrap().discount_factor(t).unwrap()
                        - curve.with_values(&down).unwrap().discount_factor(t).unwrap())
                        / (2.0 * h);
                    assert!(
                        (analytic[k] - numerical).abs() < 1e-7,
                        "{method} node {k} at t={t}: analytic={}, numerical={numerical}",
                        analytic[k]
                    );
                }
            }
        }
    }

    #[test]
    fn test_discount_factor_curve() {
        let curve = YieldCurve::new(
            CurveDefinition::new(vec![1.0, 2.0], vec![0.97, 0.94])
                .with_value_type(CurveValueType::DiscountFactor)
                .with_interpolation(InterpolationMethod::LogLinear)
                .with_anchor(1.0),
        )
        .unwrap();
        assert_relative_eq!(curve.discount_factor(1.0).unwrap(), 0.97);
        assert_relative_eq!(curve.zero_rate(1.0).unwrap(), -(0.97_f64.ln()), epsilon = 1e-14);
        assert_relative_eq!(
            curve.forward_rate(1.0, 2.0).unwrap(),
            (0.97_f64 / 0.94).ln(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            curve.instantaneous_forward(1.5).unwrap(),
            (0.97_f64 / 0.94).ln(),
            epsilon = 1e-12
        );
        // Sensitivities of a DF curve are the interpolation weights themselves
        let sens = curve.discount_factor_sensitivities(2.0).unwrap();
        assert_relative_eq!(sens[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_instantaneous_forward_of_zero_curve() {
        let curve = sample_zero_curve(InterpolationMethod::NaturalCubicSpline);
        let h = 1e-6;
        for t in [0.7, 1.5, 3.0] {
            let numerical = -(curve.discount_factor(t + h).unwrap().ln()
                - curve.discount_factor(t - h).unwrap().ln())
                / (2.0 * h);
            assert_relative_eq!(curve.instantaneous_forward(t).unwrap(), numerical, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            YieldCurve::new(CurveDefinition::new(vec![], vec![])),
            Err(CurveError::InsufficientPoints { .. })
        ));
        assert!(matches!(
            YieldCurve::new(CurveDefinition::new(vec![1.0, 1.0], vec![0.01, 0.02])),
            Err(CurveError::NonMonotonicTenors { index: 1, .. })
        ));
        assert!(YieldCurve::new(CurveDefinition::new(vec![0.0, 1.0], vec![0.01, 0.02]).with_anchor(0.01))
            .is_err());
        assert!(YieldCurve::new(CurveDefinition::new(vec![1.0], vec![f64::NAN])).is_err());
        assert!(YieldCurve::new(
            CurveDefinition::new(vec![1.0], vec![0.0]).with_value_type(CurveValueType::DiscountFactor)
        )
        .is_err());
    }

    #[test]
    fn test_query_errors() {
        let curve = sample_zero_curve(InterpolationMethod::Linear);
        assert!(matches!(
            curve.discount_factor(-1.0),
            Err(CurveError::TenorOutOfRange { .. })
        ));
        assert!(curve.forward_rate(2.0, 1.0).is_err());

        let strict = YieldCurve::new(
            CurveDefinition::new(vec![1.0, 2.0], vec![0.01, 0.02])
                .with_extrapolation(ExtrapolationMethod::None),
        )
        .unwrap();
        assert!(matches!(
            strict.value_at(3.0),
            Err(CurveError::TenorOutOfRange { .. })
        ));
    }

    #[test]
    fn test_single_node_curve_honours_extrapolation() {
        let flat = YieldCurve::new(CurveDefinition::new(vec![1.0], vec![0.03])).unwrap();
        assert_relative_eq!(flat.value_at(5.0).unwrap(), 0.03);
        assert_eq!(flat.value_sensitivities(5.0).unwrap(), vec![1.0]);

        let strict = YieldCurve::new(
            CurveDefinition::new(vec![1.0], vec![0.03]).with_extrapolation(ExtrapolationMethod::None),
        )
        .unwrap();
        assert_relative_eq!(strict.value_at(1.0).unwrap(), 0.03);
        assert!(matches!(
            strict.value_at(5.0),
            Err(CurveError::TenorOutOfRange { .. })
        ));
        assert!(strict.value_sensitivities(0.5).is_err());
        assert!(strict.discount_factor(5.0).is_err());
    }

    #[test]
    fn test_discount_factor_curve_needs_time_zero() {
        let unanchored = CurveDefinition::new(vec![0.5, 1.0], vec![0.99, 0.98])
            .with_value_type(CurveValueType::DiscountFactor);
        assert!(matches!(
            YieldCurve::new(unanchored.clone()),
            Err(CurveError::InvalidInput { .. })
        ));
        assert!(YieldCurve::new(unanchored.with_anchor(1.0)).is_ok());

        let with_origin = YieldCurve::new(
            CurveDefinition::new(vec![0.0, 1.0], vec![1.0, 0.98])
                .with_value_type(CurveValueType::DiscountFactor),
        )
        .unwrap();
        assert_relative_eq!(with_origin.discount_factor(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let curve = sample_zero_curve(InterpolationMethod::FlatForward);
        let json = serde_json::to_string(&curve).unwrap();
        let back: YieldCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back.definition(), curve.definition());

        let invalid = r#"{"times":[2.0,1.0],"values":[0.01,0.02]}"#;
        assert!(serde_json::from_str::<YieldCurve>(invalid).is_err());
    }
}
