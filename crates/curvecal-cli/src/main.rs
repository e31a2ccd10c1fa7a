//! Curvecal CLI - calibrate curves and compute bond-future basis analytics.
//!
//! # Usage
//!
//! ```bash
//! # Calibrate a curve described in TOML
//! curvecal calibrate --input demos/curve.toml --show-jacobian
//!
//! # Same, as JSON
//! curvecal --format json calibrate --input demos/curve.toml
//!
//! # Implied repo of a deliverable bond
//! curvecal implied-repo --coupon 5.0 --maturity 8 --clean 98.5 \
//!     --futures-price 108.2 --conversion-factor 0.91 --delivery 0.4
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `warn`); logs go to stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;

    match cli.command {
        Commands::Calibrate(args) => commands::calibrate::execute(args, format)?,
        Commands::ImpliedRepo(args) => commands::implied_repo::execute(args, format)?,
    }

    Ok(())
}
