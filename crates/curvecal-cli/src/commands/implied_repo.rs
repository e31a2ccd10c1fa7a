//! Implied repo command implementation.
//!
//! Computes the gross basis, net basis and implied repo rate of a single
//! deliverable bond. Prices are per 100 face.

use anyhow::Result;
use chrono::Local;
use clap::{Args, ValueEnum};
use serde::Serialize;

use curvecal_curves::prelude::*;

use crate::cli::OutputFormat;
use crate::commands::{parse_date, validate_coupon, validate_price, FrequencyChoice};
use crate::error::{CliError, CliResult};
use crate::output::{format_percent, print_header, print_json, print_table, KeyValue};

const FACE: f64 = 100.0;

/// Arguments for the implied-repo command.
#[derive(Args, Debug)]
pub struct ImpliedRepoArgs {
    /// Annual coupon rate in percent (e.g., 5.0 for 5%)
    #[arg(short, long)]
    pub coupon: f64,

    /// Bond maturity in years from valuation
    #[arg(short, long)]
    pub maturity: f64,

    /// Coupon frequency
    #[arg(long, value_enum, default_value = "semi-annual")]
    pub frequency: FrequencyChoice,

    /// Clean price per 100 face
    #[arg(long)]
    pub clean: f64,

    /// Accrued interest as a fraction of the first coupon
    #[arg(long, default_value_t = 0.0)]
    pub accrued: f64,

    /// Futures price per 100 face
    #[arg(long)]
    pub futures_price: f64,

    /// Conversion factor of the deliverable
    #[arg(long)]
    pub conversion_factor: f64,

    /// Delivery time in years from valuation
    #[arg(long, conflicts_with = "delivery_date")]
    pub delivery: Option<f64>,

    /// Delivery date (YYYY-MM-DD), resolved on the ACT/365F time axis
    #[arg(long)]
    pub delivery_date: Option<String>,

    /// Valuation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, requires = "delivery_date")]
    pub valuation_date: Option<String>,

    /// Quoted repo rate in percent, for the net basis at market repo
    #[arg(long)]
    pub repo: Option<f64>,

    /// Carry accrual basis
    #[arg(long, value_enum, default_value = "time")]
    pub carry_basis: CarryBasisChoice,
}

/// Carry accrual basis choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum CarryBasisChoice {
    /// Plain time difference
    #[default]
    Time,
    /// Act/360
    #[value(name = "act360")]
    Act360,
    /// Act/365 Fixed
    #[value(name = "act365")]
    Act365,
}

#[derive(Debug, Serialize)]
struct ImpliedRepoReport {
    delivery: f64,
    gross_basis: f64,
    implied_repo: f64,
    simple_implied_repo: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    net_basis_at_repo: Option<f64>,
    carry_basis: &'static str,
}

/// Execute the implied-repo command.
pub fn execute(args: ImpliedRepoArgs, format: OutputFormat) -> Result<()> {
    let report = calculate(&args)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_header("Bond Future Basis");
            let mut rows = vec![
                KeyValue::new("Delivery (years)", format!("{:.6}", report.delivery)),
                KeyValue::new("Carry basis", report.carry_basis),
                KeyValue::new("Gross basis", format!("{:.6}", report.gross_basis)),
                KeyValue::new("Implied repo", format_percent(report.implied_repo)),
                KeyValue::new(
                    "Implied repo (simple)",
                    format_percent(report.simple_implied_repo),
                ),
            ];
            if let Some(net_basis) = report.net_basis_at_repo {
                rows.push(KeyValue::new("Net basis at repo", format!("{net_basis:.6}")));
            }
            print_table(&rows);
        }
    }
    Ok(())
}

fn calculate(args: &ImpliedRepoArgs) -> CliResult<ImpliedRepoReport> {
    let coupon = validate_coupon(args.coupon)? / 100.0;
    let clean = validate_price(args.clean)?;
    let futures_price = validate_price(args.futures_price)?;
    let delivery = resolve_delivery(args)?;

    let calculator = match args.carry_basis {
        CarryBasisChoice::Time => BondFutureCalculator::new(),
        CarryBasisChoice::Act360 => {
            BondFutureCalculator::new().with_accrual_basis(DayCountConvention::Act360)
        }
        CarryBasisChoice::Act365 => {
            BondFutureCalculator::new().with_accrual_basis(DayCountConvention::Act365Fixed)
        }
    };

    let bond = Bond::fixed_coupon(coupon, args.maturity, args.frequency.into(), FACE, 1.0)?;
    let cf = args.conversion_factor;

    let implied_repo =
        calculator.implied_repo_rate(&bond, delivery, clean, futures_price, cf, args.accrued)?;

    let future = BondFuture::new(vec![bond.clone()], vec![cf])?;
    let quote = DeliverableQuote {
        delivery,
        clean_price: clean,
        accrued: bond.first_coupon() * args.accrued,
        repo_rate: implied_repo,
    };
    let analytics = calculator.analyze(&future, &[quote], futures_price)?;

    let net_basis_at_repo = args
        .repo
        .map(|repo| {
            calculator.net_basis(
                &bond,
                delivery,
                clean,
                futures_price,
                cf,
                args.accrued,
                repo / 100.0,
            )
        })
        .transpose()?;

    Ok(ImpliedRepoReport {
        delivery,
        gross_basis: analytics[0].gross_basis,
        implied_repo,
        simple_implied_repo: analytics[0].implied_repo,
        net_basis_at_repo,
        carry_basis: calculator.accrual_basis().name(),
    })
}

fn resolve_delivery(args: &ImpliedRepoArgs) -> CliResult<f64> {
    if let Some(delivery) = args.delivery {
        return Ok(delivery);
    }
    let delivery_date = args
        .delivery_date
        .as_deref()
        .ok_or_else(|| CliError::MissingArgument("--delivery or --delivery-date".to_string()))?;
    let delivery_date = parse_date(delivery_date)?;
    let valuation = match &args.valuation_date {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };
    Ok(DayCountConvention::time_between(valuation, delivery_date))
}
