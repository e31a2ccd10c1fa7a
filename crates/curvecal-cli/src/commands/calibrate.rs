//! Calibrate command implementation.
//!
//! Loads a TOML calibration input, runs the Newton calibrator and reports the
//! curve nodes, per-instrument diagnostics and optionally the Jacobian.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Tabled;
use tracing::warn;

use curvecal_curves::prelude::*;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{
    format_percent, format_sci, print_header, print_json, print_success, print_table, KeyValue,
};

/// Arguments for the calibrate command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Path to the calibration input (TOML)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Override the Jacobian method from the input
    #[arg(long, value_enum)]
    pub jacobian: Option<JacobianChoice>,

    /// Price and differentiate instruments in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Print the Jacobian at the solution
    #[arg(long)]
    pub show_jacobian: bool,
}

/// Jacobian method choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JacobianChoice {
    /// Analytic sensitivities
    Analytic,
    /// Central finite differences
    #[value(name = "finite-difference")]
    FiniteDifference,
}

impl From<JacobianChoice> for JacobianMode {
    fn from(choice: JacobianChoice) -> Self {
        match choice {
            JacobianChoice::Analytic => JacobianMode::Analytic,
            JacobianChoice::FiniteDifference => JacobianMode::FiniteDifference,
        }
    }
}

#[derive(Debug, Serialize)]
struct NodeReport {
    time: f64,
    value: f64,
    zero_rate: f64,
    discount_factor: f64,
}

#[derive(Debug, Serialize)]
struct InstrumentReport {
    kind: InstrumentKind,
    maturity: f64,
    quote: f64,
    par_rate: f64,
    implied_flat_rate: Option<f64>,
    residual: f64,
}

#[derive(Debug, Serialize)]
struct CalibrationReport {
    curve: CurveDefinition,
    iterations: u32,
    max_residual: f64,
    nodes: Vec<NodeReport>,
    instruments: Vec<InstrumentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jacobian: Option<Vec<Vec<f64>>>,
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Node Value")]
    value: String,
    #[tabled(rename = "Zero Rate")]
    zero_rate: String,
    #[tabled(rename = "Discount Factor")]
    discount_factor: String,
}

#[derive(Tabled)]
struct InstrumentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Maturity")]
    maturity: String,
    #[tabled(rename = "Quote")]
    quote: String,
    #[tabled(rename = "Par")]
    par_rate: String,
    #[tabled(rename = "Implied Flat")]
    implied_flat_rate: String,
    #[tabled(rename = "Residual")]
    residual: String,
}

/// Execute the calibrate command.
pub fn execute(args: CalibrateArgs, format: OutputFormat) -> Result<()> {
    let mut input = CalibrationInput::from_file(&args.input).map_err(CliError::from)?;
    if let Some(choice) = args.jacobian {
        input.calibration.jacobian = choice.into();
    }
    if args.parallel {
        input.calibration.parallel = true;
    }

    let problem = input.problem().map_err(CliError::from)?;
    let result = CurveCalibrator::new(input.calibration.clone())
        .calibrate(&problem)
        .map_err(CliError::from)?;

    let report = build_report(&input, &problem, &result, args.show_jacobian)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn build_report(
    input: &CalibrationInput,
    problem: &CalibrationProblem,
    result: &CalibrationResult,
    show_jacobian: bool,
) -> Result<CalibrationReport> {
    let curve = &result.curve;
    let nodes = curve
        .node_times()
        .iter()
        .zip(curve.node_values())
        .map(|(&time, &value)| {
            Ok(NodeReport {
                time,
                value,
                zero_rate: curve.zero_rate(time)?,
                discount_factor: curve.discount_factor(time)?,
            })
        })
        .collect::<CurveResult<Vec<_>>>()
        .map_err(CliError::from)?;

    let curves = problem.curve_set(curve);
    let instruments = problem
        .instruments()
        .iter()
        .zip(&result.residuals)
        .enumerate()
        .map(|(index, (instrument, &residual))| {
            Ok(InstrumentReport {
                kind: instrument.kind(),
                maturity: instrument.maturity(),
                quote: instrument.quote(),
                par_rate: ParRateCalculator.par_rate(instrument, &curves)?,
                implied_flat_rate: flat_rate_or_warn(index, instrument, &input.root_finder),
                residual,
            })
        })
        .collect::<CurveResult<Vec<_>>>()
        .map_err(CliError::from)?;

    let jacobian = show_jacobian.then(|| {
        (0..result.jacobian.instrument_count())
            .map(|i| result.jacobian.row(InstrumentIndex(i)))
            .collect()
    });

    Ok(CalibrationReport {
        curve: curve.definition().clone(),
        iterations: result.iterations,
        max_residual: result.max_residual(),
        nodes,
        instruments,
        jacobian,
    })
}

/// Implied flat rate for the report; failures are logged and shown as "n/a".
fn flat_rate_or_warn(
    index: usize,
    instrument: &CalibratingInstrument,
    settings: &RootFinderSettings,
) -> Option<f64> {
    match implied_flat_rate(instrument, settings) {
        Ok(rate) => Some(rate),
        Err(err) => {
            warn!(
                instrument = index,
                kind = %instrument.kind(),
                error = %err,
                "implied flat rate unavailable"
            );
            None
        }
    }
}

fn print_report(report: &CalibrationReport) {
    print_success(&format!(
        "Converged in {} iterations (max residual {})",
        report.iterations,
        format_sci(report.max_residual)
    ));

    print_header("Curve");
    print_table(&[
        KeyValue::new("Value type", report.curve.value_type.to_string()),
        KeyValue::new("Interpolation", report.curve.interpolation.to_string()),
        KeyValue::new("Extrapolation", report.curve.extrapolation.to_string()),
        KeyValue::new(
            "Anchor",
            report
                .curve
                .anchor
                .map_or_else(|| "none".to_string(), |a| format!("{a:.8}")),
        ),
    ]);

    print_header("Nodes");
    let rows: Vec<NodeRow> = report
        .nodes
        .iter()
        .map(|node| NodeRow {
            time: format!("{:.4}", node.time),
            value: format!("{:.10}", node.value),
            zero_rate: format_percent(node.zero_rate),
            discount_factor: format!("{:.10}", node.discount_factor),
        })
        .collect();
    print_table(&rows);

    print_header("Instruments");
    let rows: Vec<InstrumentRow> = report
        .instruments
        .iter()
        .enumerate()
        .map(|(index, instrument)| InstrumentRow {
            index,
            kind: instrument.kind.to_string(),
            maturity: format!("{:.4}", instrument.maturity),
            quote: format!("{:.8}", instrument.quote),
            par_rate: format!("{:.8}", instrument.par_rate),
            implied_flat_rate: instrument
                .implied_flat_rate
                .map_or_else(|| "n/a".to_string(), format_percent),
            residual: format_sci(instrument.residual),
        })
        .collect();
    print_table(&rows);

    if let Some(jacobian) = &report.jacobian {
        print_header("Jacobian (dPV / dnode)");
        let mut builder = Builder::default();
        let mut header = vec!["Instrument".to_string()];
        header.extend(report.nodes.iter().map(|n| format!("{:.4}", n.time)));
        builder.push_record(header);
        for (i, row) in jacobian.iter().enumerate() {
            let mut record = vec![format!("{i}")];
            record.extend(row.iter().map(|v| format!("{v:.6}")));
            builder.push_record(record);
        }
        println!("{}", builder.build().with(Style::rounded()));
    }
}
