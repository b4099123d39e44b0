//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the CSV workbook into a sheet
//! - reduces the metric row to realized history
//! - samples a drifted normal forecast distribution
//! - assembles the credibility-band bundle
//! - prints a summary and writes optional exports

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::{Cli, Command, ForecastArgs, InspectArgs};
use crate::dist::TimeSeriesDistribution;
use crate::domain::Series;
use crate::error::Error;
use crate::forecast::ForecastBundle;
use crate::table::source::{load_sheets, CsvSource, RecordSource};
use crate::table::Sheet;

/// Entry point for the `fbands` binary.
pub fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_forecast(args: ForecastArgs) -> Result<(), Error> {
    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let sheet = load_single_sheet(&CsvSource::new(&args.csv))?;
    let realized = sheet.to_series(&args.metric)?;

    let analyst = match &args.analyst {
        Some(row) => Some(sheet.to_series(row)?),
        None => None,
    };

    let dist = projected_distribution(&realized, &args)?;
    let bundle = ForecastBundle::from_series(
        &realized,
        &dist,
        analyst.as_ref(),
        None,
        as_of,
        &args.metric,
    )?;

    print_summary(&bundle, &realized, &dist, as_of);

    if let Some(path) = &args.html {
        crate::plot::write_html(path, &bundle, args.width, args.height)?;
        println!("Wrote chart HTML: {}", path.display());
    }
    if let Some(path) = &args.json {
        crate::io::write_bundle_json(path, &bundle)?;
        println!("Wrote bundle JSON: {}", path.display());
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), Error> {
    let sheet = load_single_sheet(&CsvSource::new(&args.csv))?;

    println!("Rows ({}):", sheet.rows().len());
    for label in sheet.rows() {
        println!("  {label}");
    }
    println!("Columns ({}):", sheet.columns().len());
    for label in sheet.columns() {
        println!("  {label}");
    }
    let date_cols = sheet.date_columns();
    println!("Date columns ({}):", date_cols.len());
    for label in &date_cols {
        println!("  {label}");
    }

    Ok(())
}

/// Load a workbook and take its single sheet.
fn load_single_sheet(source: &dyn RecordSource) -> Result<Sheet, Error> {
    let sheets = load_sheets(source)?;
    // A CSV source yields exactly one table.
    match sheets.into_iter().next() {
        Some((_, sheet)) => Ok(sheet),
        None => Err(Error::Precondition("Source yielded no sheets.".to_string())),
    }
}

/// Sample a per-period normal distribution drifted from the last realized
/// value: mean_k = last * (1 + drift)^k, std_k = |mean_k| * vol * sqrt(k).
fn projected_distribution(
    realized: &Series,
    args: &ForecastArgs,
) -> Result<TimeSeriesDistribution, Error> {
    let last = realized
        .last()
        .filter(|p| p.value.is_finite())
        .ok_or_else(|| {
            Error::Precondition(format!(
                "Metric '{}' has no usable realized history to project from.",
                args.metric
            ))
        })?;

    if args.periods == 0 {
        return Err(Error::Precondition("Forecast periods must be > 0.".to_string()));
    }

    let mut means = Vec::with_capacity(args.periods);
    let mut stds = Vec::with_capacity(args.periods);
    for k in 1..=args.periods {
        let mean = last.value * (1.0 + args.drift).powi(k as i32);
        means.push(mean);
        stds.push(mean.abs() * args.vol * (k as f64).sqrt());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    TimeSeriesDistribution::normal(args.samples, means, stds, None, &mut rng)
}

fn print_summary(
    bundle: &ForecastBundle,
    realized: &Series,
    dist: &TimeSeriesDistribution,
    as_of: chrono::NaiveDate,
) {
    println!("Metric:   {}", bundle.label);
    println!("As-of:    {as_of}");
    if let (Some(first), Some(last)) = (realized.first(), realized.last()) {
        println!(
            "Realized: {} points, {} .. {} (last value {:.4})",
            realized.len(),
            first.date,
            last.date,
            last.value
        );
    }
    println!(
        "Forecast: {} samples x {} periods",
        dist.num_samples(),
        dist.num_periods()
    );
    if let Some(last_expected) = bundle.expected.series.last() {
        println!(
            "Expected at {}: {:.4}",
            last_expected.date, last_expected.value
        );
    }
    for band in &bundle.bands {
        let (Some(lo), Some(hi)) = (band.lower.last(), band.upper.last()) else {
            continue;
        };
        println!(
            "{:>26}: [{:.4}, {:.4}] at {}",
            band.label, lo.value, hi.value, lo.date
        );
    }
}
