//! Chart rendering for forecast bundles.
//!
//! The bundle is rendered with Plotters into an SVG string, which
//! [`write_html`] wraps in a minimal HTML document. Styling follows the
//! original chart language: orange fill-between credibility bands, a red
//! expected trace with per-point marker opacity, a blue realized trace, and
//! hollow green analyst markers.
//!
//! Dates are plotted as day numbers and formatted back to ISO dates on the
//! axis, which keeps the chart coordinate system plain `f64` ranges.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;

use crate::domain::Series;
use crate::error::Error;
use crate::forecast::ForecastBundle;

/// Band fill opacity (kept low so overlapping bands stay readable).
const BAND_ALPHA: f64 = 0.18;

/// Band fill color.
const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Render a bundle to an SVG string.
pub fn render_svg(bundle: &ForecastBundle, width: u32, height: u32) -> Result<String, Error> {
    let (x_range, y_range) = chart_ranges(bundle)?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|x| format_day(*x))
            .y_desc(bundle.label.clone())
            .draw()
            .map_err(render_err)?;

        // Bands first so the line traces draw on top of the fills.
        for band in &bundle.bands {
            let polygon = band_polygon(&band.lower, &band.upper);
            if polygon.len() >= 3 {
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        polygon,
                        &ORANGE.mix(BAND_ALPHA),
                    )))
                    .map_err(render_err)?
                    .label(band.label.clone())
                    .legend(|(x, y)| {
                        Rectangle::new([(x, y - 4), (x + 16, y + 4)], ORANGE.mix(0.4).filled())
                    });
            }
        }

        if let Some(realized) = &bundle.realized {
            chart
                .draw_series(LineSeries::new(series_coords(realized), &BLUE))
                .map_err(render_err)?
                .label("Realized")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &BLUE));
            chart
                .draw_series(
                    series_coords(realized).map(|pt| Circle::new(pt, 3, BLUE.filled())),
                )
                .map_err(render_err)?;
        }

        chart
            .draw_series(LineSeries::new(series_coords(&bundle.expected.series), &RED))
            .map_err(render_err)?
            .label("Expected")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &RED));
        // Marker opacity hides the stitched anchor point while keeping true
        // forecast points visible. Zip before filtering missing points so
        // opacities stay aligned with their points.
        chart
            .draw_series(
                bundle
                    .expected
                    .series
                    .iter()
                    .zip(bundle.expected.marker_opacity.iter().copied())
                    .filter(|(p, _)| p.value.is_finite())
                    .map(|(p, opacity)| {
                        Circle::new((day_number(p.date), p.value), 3, RED.mix(opacity).filled())
                    }),
            )
            .map_err(render_err)?;

        if let Some(analyst) = &bundle.analyst {
            chart
                .draw_series(
                    series_coords(analyst)
                        .map(|pt| Circle::new(pt, 4, GREEN.stroke_width(2))),
                )
                .map_err(render_err)?
                .label("Analyst Estimates")
                .legend(|(x, y)| Circle::new((x + 8, y), 4, GREEN.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.85))
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    Ok(svg)
}

/// Render a bundle and write it to `path` as a standalone HTML document.
///
/// The file handle is scoped to this function and explicitly flushed; every
/// failure path maps to [`Error::Io`] with the offending path.
pub fn write_html(path: &Path, bundle: &ForecastBundle, width: u32, height: u32) -> Result<(), Error> {
    let svg = render_svg(bundle, width, height)?;

    let mut file = File::create(path)
        .map_err(|e| Error::Io(format!("Failed to create chart HTML '{}': {e}", path.display())))?;
    write!(
        file,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        bundle.label, svg
    )
    .map_err(|e| Error::Io(format!("Failed to write chart HTML '{}': {e}", path.display())))?;
    file.flush()
        .map_err(|e| Error::Io(format!("Failed to flush chart HTML '{}': {e}", path.display())))?;

    Ok(())
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(format!("Chart rendering failed: {e}"))
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn format_day(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `(x, y)` coordinates of a series, skipping missing points.
fn series_coords(series: &Series) -> impl Iterator<Item = (f64, f64)> + '_ {
    series
        .iter()
        .filter(|p| p.value.is_finite())
        .map(|p| (day_number(p.date), p.value))
}

/// Closed fill-between outline: lower edge left-to-right, upper edge back.
fn band_polygon(lower: &Series, upper: &Series) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = series_coords(lower).collect();
    let mut upper_pts: Vec<(f64, f64)> = series_coords(upper).collect();
    upper_pts.reverse();
    pts.extend(upper_pts);
    pts
}

/// Padded x/y ranges covering every series in the bundle.
fn chart_ranges(
    bundle: &ForecastBundle,
) -> Result<(std::ops::Range<f64>, std::ops::Range<f64>), Error> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    let mut cover = |series: &Series| {
        for (x, y) in series_coords(series) {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    };

    for band in &bundle.bands {
        cover(&band.lower);
        cover(&band.upper);
    }
    cover(&bundle.expected.series);
    if let Some(realized) = &bundle.realized {
        cover(realized);
    }
    if let Some(analyst) = &bundle.analyst {
        cover(analyst);
    }

    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return Err(Error::Render("Nothing to plot: no finite points in bundle.".to_string()));
    }

    // Degenerate ranges (single date or flat values) get a small pad so the
    // cartesian build cannot fail.
    if x_max - x_min < 1.0 {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let y_pad = ((y_max - y_min) * 0.05).max(1e-9).max(y_max.abs() * 1e-6);
    y_min -= y_pad;
    y_max += y_pad;
    let x_pad = (x_max - x_min) * 0.02;

    Ok(((x_min - x_pad)..(x_max + x_pad), y_min..y_max))
}
