//! Siegel CLI - Nelson-Siegel yield curve calibration.
//!
//! # Usage
//!
//! ```bash
//! # Calibrate to a basket of bonds
//! siegel calibrate data/rikb.toml
//!
//! # Show the discounted cashflow schedules
//! siegel schedule data/rikb.toml --format csv
//!
//! # Evaluate a curve for known parameters
//! siegel curve --theta0 0.06 --theta1 0.03 --theta2 -0.01 --lambda 1.8 --points 40
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod basket_file;
mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to stderr so JSON and CSV output stay clean
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("siegel_curves=debug,siegel_math=debug,siegel_cli=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Calibrate(args) => commands::calibrate::execute(args, format, quiet)?,
        Commands::Schedule(args) => commands::schedule::execute(args, format, quiet)?,
        Commands::Curve(args) => commands::curve::execute(args, format, quiet)?,
    }

    Ok(())
}
