//! Credibility banding and continuity stitching.
//!
//! Given a `(samples x periods)` forecast distribution and the dates its
//! periods map onto, the builder emits:
//!
//! - one fill-between band per credibility level in [`CREDIBILITY_LEVELS`]
//! - an expected trace (per-period sample mean) with a marker-opacity vector
//! - the realized and analyst series passed through unchanged
//!
//! When realized history exists, the band edges and the expected trace are
//! prepended with a synthetic point at the last realized date holding the
//! last realized value, so the plotted region originates exactly where
//! history ends. The prepended expected point gets marker opacity 0 (the
//! series values themselves are untouched).
//!
//! Every emitted series is sorted ascending by date. Rendering is an
//! external concern; the bundle is a pure value.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::year_end_periods;
use crate::dist::TimeSeriesDistribution;
use crate::domain::Series;
use crate::error::Error;
use crate::forecast::stats;
use crate::table::Sheet;

/// The fixed credibility levels, in emission order.
pub const CREDIBILITY_LEVELS: [u32; 3] = [68, 90, 95];

/// A fill-between band at one credibility level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibilityBand {
    pub level: u32,
    /// Legend label, `"{level}% Credibility Interval"`.
    pub label: String,
    pub lower: Series,
    pub upper: Series,
}

/// Per-period sample mean, plus the per-point marker opacity the renderer
/// applies (0.0 hides the stitched anchor point's marker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedTrace {
    pub series: Series,
    pub marker_opacity: Vec<f64>,
}

/// Everything an external renderer needs to draw one forecast chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    /// Data label (typically the metric name); used for the y-axis.
    pub label: String,
    pub bands: Vec<CredibilityBand>,
    pub expected: ExpectedTrace,
    pub realized: Option<Series>,
    pub analyst: Option<Series>,
}

impl ForecastBundle {
    /// Build a bundle from a distribution and explicit future dates.
    ///
    /// `future_dates` must hold one date per forecast period; a length
    /// mismatch fails with [`Error::ShapeMismatch`].
    pub fn build(
        dist: &TimeSeriesDistribution,
        future_dates: &[NaiveDate],
        realized: Option<&Series>,
        analyst: Option<&Series>,
        label: &str,
    ) -> Result<ForecastBundle, Error> {
        if future_dates.len() != dist.num_periods() {
            return Err(Error::ShapeMismatch(format!(
                "Expected one future date per forecast period ({} dates for {} periods).",
                future_dates.len(),
                dist.num_periods()
            )));
        }

        // The stitch anchor: last realized point, if any history exists.
        let anchor = realized.filter(|r| !r.is_empty()).and_then(Series::last);

        let mut bands = Vec::with_capacity(CREDIBILITY_LEVELS.len());
        for level in CREDIBILITY_LEVELS {
            let tail = (100.0 - level as f64) / 2.0;
            let lower = period_series(dist, future_dates, |samples| {
                stats::percentile(samples, tail)
            });
            let upper = period_series(dist, future_dates, |samples| {
                stats::percentile(samples, 100.0 - tail)
            });

            let (lower, upper) = match anchor {
                Some(a) => (
                    lower.with_leading_point(a.date, a.value),
                    upper.with_leading_point(a.date, a.value),
                ),
                None => (lower, upper),
            };

            bands.push(CredibilityBand {
                level,
                label: format!("{level}% Credibility Interval"),
                lower,
                upper,
            });
        }

        let expected_series = period_series(dist, future_dates, stats::mean);
        let expected = match anchor {
            Some(a) => {
                let series = expected_series.with_leading_point(a.date, a.value);
                let mut marker_opacity = vec![1.0; series.len()];
                marker_opacity[0] = 0.0;
                ExpectedTrace { series, marker_opacity }
            }
            None => {
                let marker_opacity = vec![1.0; expected_series.len()];
                ExpectedTrace { series: expected_series, marker_opacity }
            }
        };

        Ok(ForecastBundle {
            label: label.to_string(),
            bands,
            expected,
            realized: realized.filter(|r| !r.is_empty()).cloned(),
            analyst: analyst.filter(|a| !a.is_empty()).cloned(),
        })
    }

    /// Build from a pre-existing realized series, defaulting the future
    /// dates to year-end periods from `as_of` when none are supplied.
    pub fn from_series(
        realized: &Series,
        dist: &TimeSeriesDistribution,
        analyst: Option<&Series>,
        future_dates: Option<Vec<NaiveDate>>,
        as_of: NaiveDate,
        label: &str,
    ) -> Result<ForecastBundle, Error> {
        let future_dates = match future_dates {
            Some(d) => d,
            None => default_future_dates(as_of, dist.num_periods())?,
        };
        ForecastBundle::build(dist, &future_dates, Some(realized), analyst, label)
    }

    /// Build from a labeled tabular source: the metric row is reduced to a
    /// realized series first (row lookup + date-column discovery + date
    /// normalization), then fed through [`ForecastBundle::build`].
    pub fn from_sheet(
        sheet: &Sheet,
        metric: &str,
        dist: &TimeSeriesDistribution,
        analyst: Option<&Series>,
        future_dates: Option<Vec<NaiveDate>>,
        as_of: NaiveDate,
    ) -> Result<ForecastBundle, Error> {
        let realized = sheet.to_series(metric)?;
        ForecastBundle::from_series(&realized, dist, analyst, future_dates, as_of, metric)
    }
}

/// Map each forecast period's sample column through a statistic, indexed by
/// the future dates. A period with no finite samples degrades to a missing
/// point rather than failing.
fn period_series(
    dist: &TimeSeriesDistribution,
    future_dates: &[NaiveDate],
    stat: impl Fn(&[f64]) -> Option<f64>,
) -> Series {
    let values = dist.values();
    let pairs = future_dates.iter().enumerate().map(|(period, date)| {
        let column: Vec<f64> = values.column(period).iter().copied().collect();
        (*date, stat(&column).unwrap_or(f64::NAN))
    });
    Series::from_pairs(pairs)
}

/// Year-end period dates for `num_periods` periods starting at `as_of`.
///
/// The terminal date is December 31 of `as_of.year + num_periods - 1`; the
/// generator's 30-period cap applies, so more than 30 periods cannot be
/// mapped this way (supply explicit dates instead).
pub fn default_future_dates(as_of: NaiveDate, num_periods: usize) -> Result<Vec<NaiveDate>, Error> {
    if num_periods == 0 {
        return Err(Error::Precondition("Cannot map zero forecast periods onto dates.".to_string()));
    }
    let terminal_year = as_of.year() + (num_periods as i32 - 1);
    let terminal = NaiveDate::from_ymd_opt(terminal_year, 12, 31).ok_or_else(|| {
        Error::Precondition(format!("Terminal year {terminal_year} out of calendar range."))
    })?;

    let dates: Vec<NaiveDate> = year_end_periods(as_of, terminal)?
        .map(|(_, date)| date)
        .collect();

    if dates.len() != num_periods {
        return Err(Error::ShapeMismatch(format!(
            "Generated {} year-end dates for {} forecast periods.",
            dates.len(),
            num_periods
        )));
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Two periods, constant across samples: period 0 = 110, period 1 = 120.
    fn constant_dist() -> TimeSeriesDistribution {
        let values = DMatrix::from_fn(40, 2, |_, j| 110.0 + 10.0 * j as f64);
        TimeSeriesDistribution::from_matrix(values)
    }

    fn history() -> Series {
        Series::from_pairs([(d(2023, 12, 31), 90.0), (d(2024, 6, 30), 100.0)])
    }

    #[test]
    fn expected_trace_is_stitched_to_last_realized_point() {
        let dist = constant_dist();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31)];
        let bundle =
            ForecastBundle::build(&dist, &future, Some(&history()), None, "Revenue").unwrap();

        let pts = bundle.expected.series.points();
        assert_eq!(pts.len(), 3);
        assert_eq!((pts[0].date, pts[0].value), (d(2024, 6, 30), 100.0));
        assert_eq!((pts[1].date, pts[1].value), (d(2025, 12, 31), 110.0));
        assert_eq!(bundle.expected.marker_opacity[0], 0.0);
        assert!(bundle.expected.marker_opacity[1..].iter().all(|&o| o == 1.0));
    }

    #[test]
    fn bands_are_stitched_with_the_realized_value_not_the_band_value() {
        let dist = constant_dist();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31)];
        let bundle =
            ForecastBundle::build(&dist, &future, Some(&history()), None, "Revenue").unwrap();

        for band in &bundle.bands {
            let lower = band.lower.points();
            let upper = band.upper.points();
            assert_eq!(lower.len(), 3);
            assert_eq!((lower[0].date, lower[0].value), (d(2024, 6, 30), 100.0));
            assert_eq!((upper[0].date, upper[0].value), (d(2024, 6, 30), 100.0));
        }
    }

    #[test]
    fn no_history_means_no_stitch_and_full_opacity() {
        let dist = constant_dist();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31)];
        let bundle = ForecastBundle::build(&dist, &future, None, None, "Revenue").unwrap();

        assert_eq!(bundle.expected.series.len(), 2);
        assert_eq!(bundle.expected.marker_opacity, vec![1.0, 1.0]);
        assert!(bundle.realized.is_none());
        for band in &bundle.bands {
            assert_eq!(band.lower.len(), 2);
        }
    }

    #[test]
    fn band_labels_and_levels() {
        let dist = constant_dist();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31)];
        let bundle = ForecastBundle::build(&dist, &future, None, None, "Revenue").unwrap();
        let labels: Vec<&str> = bundle.bands.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "68% Credibility Interval",
                "90% Credibility Interval",
                "95% Credibility Interval"
            ]
        );
    }

    #[test]
    fn bands_bracket_the_expected_trace() {
        // Statistical property over a real sampled grid.
        let mut rng = StdRng::seed_from_u64(42);
        let means = vec![100.0, 110.0, 121.0];
        let dist = TimeSeriesDistribution::normal(500, means, 5.0, None, &mut rng).unwrap();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31), d(2027, 12, 31)];
        let bundle = ForecastBundle::build(&dist, &future, None, None, "Revenue").unwrap();

        for band in &bundle.bands {
            for (period, expected) in bundle.expected.series.points().iter().enumerate() {
                let lo = band.lower.points()[period].value;
                let hi = band.upper.points()[period].value;
                assert!(lo <= expected.value && expected.value <= hi, "level {}", band.level);
            }
        }
    }

    #[test]
    fn future_date_count_must_match_periods() {
        let dist = constant_dist();
        let err = ForecastBundle::build(&dist, &[d(2025, 12, 31)], None, None, "x").unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn realized_and_analyst_pass_through_sorted() {
        let dist = constant_dist();
        let future = vec![d(2025, 12, 31), d(2026, 12, 31)];
        let analyst = Series::from_pairs([(d(2026, 12, 31), 125.0), (d(2025, 12, 31), 112.0)]);
        let bundle =
            ForecastBundle::build(&dist, &future, Some(&history()), Some(&analyst), "Revenue")
                .unwrap();

        assert_eq!(bundle.realized.as_ref().unwrap(), &history());
        let analyst_dates = bundle.analyst.as_ref().unwrap().dates();
        assert_eq!(analyst_dates, vec![d(2025, 12, 31), d(2026, 12, 31)]);
    }

    #[test]
    fn from_sheet_reduces_the_metric_row_first() {
        use crate::table::RawTable;

        let table = RawTable {
            headers: vec![
                "Item".to_string(),
                "Metric".to_string(),
                "12-31-23".to_string(),
                "06-30-24".to_string(),
            ],
            rows: vec![vec![
                "Revenue".to_string(),
                "1".to_string(),
                "90.0".to_string(),
                "100.0".to_string(),
            ]],
        };
        let sheet = Sheet::new(&table).unwrap();
        let dist = constant_dist();
        let bundle = ForecastBundle::from_sheet(
            &sheet,
            "Revenue",
            &dist,
            None,
            None,
            d(2025, 3, 1),
        )
        .unwrap();

        // History ends 2024-06-30 at 100; default future dates are the next
        // two year-ends from the as-of date.
        let pts = bundle.expected.series.points();
        assert_eq!((pts[0].date, pts[0].value), (d(2024, 6, 30), 100.0));
        assert_eq!(pts[1].date, d(2025, 12, 31));
        assert_eq!(pts[2].date, d(2026, 12, 31));
    }

    #[test]
    fn default_future_dates_map_periods_onto_year_ends() {
        let dates = default_future_dates(d(2024, 3, 1), 3).unwrap();
        assert_eq!(dates, vec![d(2024, 12, 31), d(2025, 12, 31), d(2026, 12, 31)]);
    }
}
