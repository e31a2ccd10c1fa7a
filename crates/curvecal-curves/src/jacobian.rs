//! Jacobian of instrument present values with respect to curve nodes.
//!
//! Row `i` belongs to calibrating instrument `i` and column `j` to free curve
//! node `j`, both in the order fixed by the [`CalibrationProblem`]. The
//! typed indices [`InstrumentIndex`] and [`NodeIndex`] keep the two axes from
//! being swapped.
//!
//! [`AnalyticJacobian`] builds each row from the instrument's sensitivity
//! pairs:
//!
//! ```text
//! J[i][j] = Σ_pairs weight · ∂DF(time)/∂node_j
//! ```
//!
//! [`FiniteDifferenceJacobian`] bumps each node up and down and reprices
//! everything; it exists to validate the analytic version and as a fallback.

use std::fmt;
use std::ops::Index;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationProblem;
use crate::error::{CurveError, CurveResult};
use crate::parallel::maybe_parallel_try_map;

/// Row index: position of an instrument in the calibration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstrumentIndex(pub usize);

/// Column index: position of a free node on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for InstrumentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instrument {}", self.0)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Dense matrix of `∂PV_i/∂node_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jacobian {
    matrix: DMatrix<f64>,
}

impl Jacobian {
    /// Builds a Jacobian from rows (one per instrument).
    pub fn from_rows(rows: &[Vec<f64>], columns: usize) -> CurveResult<Self> {
        if let Some(i) = rows.iter().position(|row| row.len() != columns) {
            return Err(CurveError::invalid_input(format!(
                "Jacobian row {i} has {} entries, expected {columns}",
                rows[i].len()
            )));
        }
        let matrix = DMatrix::from_fn(rows.len(), columns, |i, j| rows[i][j]);
        Ok(Self { matrix })
    }

    /// Builds a Jacobian from columns (one per node).
    pub fn from_columns(columns: &[Vec<f64>], rows: usize) -> CurveResult<Self> {
        if let Some(j) = columns.iter().position(|column| column.len() != rows) {
            return Err(CurveError::invalid_input(format!(
                "Jacobian column {j} has {} entries, expected {rows}",
                columns[j].len()
            )));
        }
        let matrix = DMatrix::from_fn(rows, columns.len(), |i, j| columns[j][i]);
        Ok(Self { matrix })
    }

    /// Entry for an instrument and a node.
    #[must_use]
    pub fn get(&self, instrument: InstrumentIndex, node: NodeIndex) -> Option<f64> {
        self.matrix.get((instrument.0, node.0)).copied()
    }

    /// Row of an instrument.
    #[must_use]
    pub fn row(&self, instrument: InstrumentIndex) -> Vec<f64> {
        self.matrix.row(instrument.0).iter().copied().collect()
    }

    /// Number of instruments.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.matrix.ncols()
    }

    /// The underlying matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Largest absolute entry.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.matrix.amax()
    }
}

impl Index<(InstrumentIndex, NodeIndex)> for Jacobian {
    type Output = f64;

    fn index(&self, (instrument, node): (InstrumentIndex, NodeIndex)) -> &f64 {
        &self.matrix[(instrument.0, node.0)]
    }
}

/// Computes the Jacobian at a trial vector of node values.
pub trait JacobianCalculator: Send + Sync {
    /// Jacobian at `node_values`, rows in instrument order and columns in node order.
    fn evaluate(&self, node_values: &[f64]) -> CurveResult<Jacobian>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Jacobian from sensitivity pairs and analytic interpolation sensitivities.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticJacobian<'a> {
    problem: &'a CalibrationProblem,
    parallel: bool,
}

impl<'a> AnalyticJacobian<'a> {
    /// Creates a calculator for a problem.
    #[must_use]
    pub fn new(problem: &'a CalibrationProblem) -> Self {
        Self {
            problem,
            parallel: false,
        }
    }

    /// Computes rows in parallel when the `parallel` feature is enabled.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl JacobianCalculator for AnalyticJacobian<'_> {
    fn evaluate(&self, node_values: &[f64]) -> CurveResult<Jacobian> {
        let curve = self.problem.trial_curve(node_values)?;
        let sensitivities = self.problem.sensitivities(&curve, self.parallel)?;
        let columns = curve.node_count();

        let rows = maybe_parallel_try_map(&sensitivities, self.parallel, |sens| {
            let mut row = vec![0.0; columns];
            for pair in self.problem.calibrated_pairs(sens) {
                let df_sens = curve.discount_factor_sensitivities(pair.time)?;
                for (entry, s) in row.iter_mut().zip(df_sens.iter()) {
                    *entry += pair.weight * s;
                }
            }
            Ok(row)
        })?;

        Jacobian::from_rows(&rows, columns)
    }

    fn name(&self) -> &'static str {
        "Analytic"
    }
}

/// Central finite-difference Jacobian.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifferenceJacobian<'a> {
    problem: &'a CalibrationProblem,
    bump: f64,
    parallel: bool,
}

impl<'a> FiniteDifferenceJacobian<'a> {
    /// Creates a calculator bumping each node by `±bump`.
    #[must_use]
    pub fn new(problem: &'a CalibrationProblem, bump: f64) -> Self {
        Self {
            problem,
            bump,
            parallel: false,
        }
    }

    /// Bumps nodes in parallel when the `parallel` feature is enabled.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl JacobianCalculator for FiniteDifferenceJacobian<'_> {
    fn evaluate(&self, node_values: &[f64]) -> CurveResult<Jacobian> {
        if !(self.bump.is_finite() && self.bump > 0.0) {
            return Err(CurveError::invalid_input(format!(
                "finite difference bump must be positive, got {}",
                self.bump
            )));
        }
        let nodes: Vec<usize> = (0..node_values.len()).collect();
        let columns = maybe_parallel_try_map(&nodes, self.parallel, |&j| {
            let mut up = node_values.to_vec();
            up[j] += self.bump;
            let mut down = node_values.to_vec();
            down[j] -= self.bump;
            let pv_up = self
                .problem
                .residuals(&self.problem.trial_curve(&up)?, false)?;
            let pv_down = self
                .problem
                .residuals(&self.problem.trial_curve(&down)?, false)?;
            Ok(pv_up
                .iter()
                .zip(pv_down.iter())
                .map(|(u, d)| (u - d) / (2.0 * self.bump))
                .collect::<Vec<f64>>())
        })?;

        Jacobian::from_columns(&columns, self.problem.instruments().len())
    }

    fn name(&self) -> &'static str {
        "FiniteDifference"
    }
}
