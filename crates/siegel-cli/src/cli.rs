//! CLI argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{CalibrateArgs, CurveArgs, ScheduleArgs};

/// Siegel - Nelson-Siegel yield curve calibration
#[derive(Parser)]
#[command(name = "siegel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log optimizer progress to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Calibrate the model to the instruments in a basket file
    Calibrate(CalibrateArgs),

    /// Show discounted cashflow schedules for a basket file
    Schedule(ScheduleArgs),

    /// Evaluate a curve for given parameters
    Curve(CurveArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// Maturity grid options shared by the curve-printing commands.
#[derive(Args, Debug, Clone, Copy)]
pub struct GridArgs {
    /// First maturity in years
    #[arg(long, default_value = "0.1")]
    pub start: f64,

    /// Last maturity in years
    #[arg(long, default_value = "20")]
    pub end: f64,

    /// Number of grid points
    #[arg(long, default_value = "20")]
    pub points: usize,
}
