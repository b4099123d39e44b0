//! Date normalization and forecast-period generation.
//!
//! Spreadsheet exports in this domain carry dates in a handful of loose
//! encodings: `MM-DD-YY`, `MM/DD/YY`, ISO `YYYY-MM-DD`, optionally suffixed
//! with an " E" (estimate) or " A" (actual) annotation. This module turns all
//! of them into `chrono::NaiveDate` deterministically, and generates the
//! synthetic year-end dates that forecast periods are mapped onto when no
//! explicit date list is supplied.

use chrono::{Datelike, NaiveDate};

use crate::error::Error;

/// Two-digit years above this pivot are read as 19xx, the rest as 20xx.
const CENTURY_PIVOT: u32 = 50;

/// Hard cap on generated forecast periods, regardless of the end date.
pub const MAX_PERIODS: usize = 30;

/// Normalize a heterogeneous date string to a calendar date.
///
/// Accepted forms (after stripping a trailing " E"/" A" marker and unifying
/// `/` separators to `-`):
///
/// - `MM-DD-YY` with century disambiguation (`> 50` → 1900s, else 2000s)
/// - `YYYY-MM-DD`
///
/// Anything else fails with [`Error::UnsupportedDate`].
pub fn normalize_date(input: &str) -> Result<NaiveDate, Error> {
    let trimmed = input.trim();
    // At most one annotation marker; "03/01/24 E E" is malformed, not dated.
    let trimmed = trimmed
        .strip_suffix(" E")
        .or_else(|| trimmed.strip_suffix(" A"))
        .unwrap_or(trimmed);
    let s = trimmed.replace('/', "-");

    if is_two_digit_form(&s) {
        let month: u32 = s[0..2].parse().map_err(|_| unsupported(input))?;
        let day: u32 = s[3..5].parse().map_err(|_| unsupported(input))?;
        let yy: u32 = s[6..8].parse().map_err(|_| unsupported(input))?;
        let year = if yy > CENTURY_PIVOT { 1900 + yy } else { 2000 + yy };
        return NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| unsupported(input));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| unsupported(input))
}

/// Element-wise [`normalize_date`] over a list of date strings.
pub fn normalize_dates<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<NaiveDate>, Error> {
    inputs.iter().map(|s| normalize_date(s.as_ref())).collect()
}

fn unsupported(input: &str) -> Error {
    Error::UnsupportedDate(format!(
        "Unsupported date encoding '{input}'. Expected MM-DD-YY, MM/DD/YY, or YYYY-MM-DD \
         (optionally suffixed with ' E' or ' A')."
    ))
}

/// `MM-DD-YY` shape check: exactly `\d{2}-\d{2}-\d{2}`.
fn is_two_digit_form(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 8
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b'-'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
        && b[5] == b'-'
        && b[6].is_ascii_digit()
        && b[7].is_ascii_digit()
}

/// Lazy sequence of `(period_index, period_date)` pairs.
///
/// Produced by [`year_end_periods`]; see its documentation for semantics.
#[derive(Debug, Clone)]
pub struct YearEndPeriods {
    next_date: NaiveDate,
    end: NaiveDate,
    idx: usize,
    done: bool,
}

impl Iterator for YearEndPeriods {
    type Item = (usize, NaiveDate);

    fn next(&mut self) -> Option<(usize, NaiveDate)> {
        if self.done || self.idx >= MAX_PERIODS {
            return None;
        }
        let out = (self.idx, self.next_date);
        self.idx += 1;
        // The date just yielded decides termination: the first period date
        // at or past `end` is the last one produced. The first date is
        // always produced, even when it already lies beyond `end`.
        if self.next_date >= self.end {
            self.done = true;
        } else {
            match self.next_date.with_year(self.next_date.year() + 1) {
                Some(d) => self.next_date = d,
                None => self.done = true,
            }
        }
        Some(out)
    }
}

/// Generate year-end forecast period dates.
///
/// Periods start at December 31 of `start`'s year and advance one year at a
/// time; the first date at or past `end` is the last one produced,
/// hard-capped at [`MAX_PERIODS`]. Fails with [`Error::Precondition`] if
/// `end` is not strictly after `start`.
pub fn year_end_periods(start: NaiveDate, end: NaiveDate) -> Result<YearEndPeriods, Error> {
    if end <= start {
        return Err(Error::Precondition(format!(
            "Expected end date ({end}) to be strictly after start date ({start})."
        )));
    }

    // Dec 31 exists in every year, so the unwrap_or fallback is unreachable;
    // keep it total anyway.
    let first = NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start);

    Ok(YearEndPeriods {
        next_date: first,
        end,
        idx: 0,
        done: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn normalize_two_digit_years_across_century_pivot() {
        assert_eq!(normalize_date("07-15-98").unwrap(), d(1998, 7, 15));
        assert_eq!(normalize_date("07-15-20").unwrap(), d(2020, 7, 15));
    }

    #[test]
    fn normalize_strips_annotations_and_slashes() {
        assert_eq!(normalize_date("03/01/24 E").unwrap(), d(2024, 3, 1));
        assert_eq!(normalize_date("03/01/24 A").unwrap(), d(2024, 3, 1));
    }

    #[test]
    fn normalize_accepts_iso() {
        assert_eq!(normalize_date("2024-03-01").unwrap(), d(2024, 3, 1));
    }

    #[test]
    fn normalize_rejects_unknown_encodings() {
        for bad in ["15 July 1998", "2024-3-1x", "", "07-15-1998 E", "03/01/24 E E"] {
            assert!(matches!(normalize_date(bad), Err(Error::UnsupportedDate(_))), "{bad}");
        }
    }

    #[test]
    fn normalize_dates_is_elementwise() {
        let out = normalize_dates(&["12-31-22", "12/31/23"]).unwrap();
        assert_eq!(out, vec![d(2022, 12, 31), d(2023, 12, 31)]);
    }

    #[test]
    fn year_end_periods_basic() {
        let periods: Vec<_> = year_end_periods(d(2024, 3, 1), d(2026, 6, 1)).unwrap().collect();
        assert_eq!(
            periods,
            vec![(0, d(2024, 12, 31)), (1, d(2025, 12, 31)), (2, d(2026, 12, 31))]
        );
    }

    #[test]
    fn year_end_periods_always_yields_first_date() {
        // End before the first Dec 31: the first period is still produced.
        let periods: Vec<_> = year_end_periods(d(2024, 3, 1), d(2024, 6, 1)).unwrap().collect();
        assert_eq!(periods, vec![(0, d(2024, 12, 31))]);
    }

    #[test]
    fn year_end_periods_includes_the_first_date_past_end() {
        // End falls mid-year: the year-end after it is still produced, the
        // one after that is not.
        let periods: Vec<_> = year_end_periods(d(2024, 3, 1), d(2026, 6, 1)).unwrap().collect();
        assert_eq!(periods.last(), Some(&(2, d(2026, 12, 31))));
        assert_eq!(periods.len(), 3);
    }

    #[test]
    fn year_end_periods_ends_on_a_year_end() {
        // End exactly on a Dec 31: that date is the last one produced.
        let periods: Vec<_> =
            year_end_periods(d(2024, 3, 1), d(2026, 12, 31)).unwrap().collect();
        assert_eq!(
            periods,
            vec![(0, d(2024, 12, 31)), (1, d(2025, 12, 31)), (2, d(2026, 12, 31))]
        );
    }

    #[test]
    fn year_end_periods_caps_at_thirty() {
        let periods: Vec<_> = year_end_periods(d(2000, 1, 1), d(2999, 1, 1)).unwrap().collect();
        assert_eq!(periods.len(), MAX_PERIODS);
        assert_eq!(periods[29], (29, d(2029, 12, 31)));
    }

    #[test]
    fn year_end_periods_requires_end_after_start() {
        let err = year_end_periods(d(2024, 3, 1), d(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }
}
