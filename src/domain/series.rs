//! Date-indexed series.
//!
//! `Series` plays the role a date-indexed column plays in spreadsheet-driven
//! workflows: an ordered list of `(date, value)` points. The ordering
//! guarantee (ascending by date) is established at construction and preserved
//! by every operation, so downstream consumers (banding, rendering, exports)
//! never re-sort.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation in a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An owned series of `(date, value)` points, always sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from unordered `(date, value)` pairs.
    ///
    /// The pairs are sorted ascending by date; duplicate dates are kept in
    /// their given relative order (stable sort).
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut points: Vec<SeriesPoint> = pairs
            .into_iter()
            .map(|(date, value)| SeriesPoint { date, value })
            .collect();
        points.sort_by_key(|p| p.date);
        Series { points }
    }

    /// The empty series.
    pub fn empty() -> Self {
        Series { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<SeriesPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<SeriesPoint> {
        self.points.last().copied()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Return a new series with `(date, value)` inserted and the result
    /// re-sorted by date.
    ///
    /// This is the continuity-stitch primitive: prepending the last realized
    /// point to a forecast series so the plotted line/band begins exactly
    /// where history ends. When `date` ties an existing date the new point
    /// sorts first.
    pub fn with_leading_point(&self, date: NaiveDate, value: f64) -> Series {
        let mut points = Vec::with_capacity(self.points.len() + 1);
        points.push(SeriesPoint { date, value });
        points.extend_from_slice(&self.points);
        points.sort_by_key(|p| p.date);
        Series { points }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }
}
