//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{CalibrateArgs, ImpliedRepoArgs};

/// Curvecal - curve calibration and sensitivity engine
#[derive(Parser)]
#[command(name = "curvecal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Calibrate a curve from a TOML calibration input
    Calibrate(CalibrateArgs),

    /// Implied repo rate and basis of a bond-future deliverable
    ImpliedRepo(ImpliedRepoArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON
    Json,
}
