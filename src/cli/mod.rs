//! Command-line parsing for the forecast-band builder.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the data-model/banding code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fbands", version, about = "Monte-Carlo forecast bands over spreadsheet history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a forecast for one metric row, print a summary, and optionally
    /// write the chart HTML and/or bundle JSON.
    Forecast(ForecastArgs),
    /// Print a sheet's row labels, columns, and discovered date columns.
    Inspect(InspectArgs),
}

/// Options for `fbands forecast`.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// CSV export of a spreadsheet tab (first column holds row labels).
    #[arg(long)]
    pub csv: PathBuf,

    /// Metric row to forecast (e.g. "Revenue").
    #[arg(short = 'm', long)]
    pub metric: String,

    /// Optional row holding analyst point estimates for the same metric.
    #[arg(long)]
    pub analyst: Option<String>,

    /// Monte-Carlo samples per forecast period.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub samples: usize,

    /// Forecast periods, mapped onto year-end dates from the as-of date.
    #[arg(short = 'p', long, default_value_t = 5)]
    pub periods: usize,

    /// Annual drift applied to the last realized value.
    #[arg(long, default_value_t = 0.05)]
    pub drift: f64,

    /// Annual volatility as a fraction of the projected level.
    #[arg(long, default_value_t = 0.2)]
    pub vol: f64,

    /// Valuation (as-of) date; defaults to today.
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Random seed for sampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write the rendered chart HTML to this path.
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Write the bundle JSON to this path.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Chart width in pixels.
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = 540)]
    pub height: u32,
}

/// Options for `fbands inspect`.
#[derive(Debug, Parser, Clone)]
pub struct InspectArgs {
    /// CSV export of a spreadsheet tab (first column holds row labels).
    #[arg(long)]
    pub csv: PathBuf,
}
