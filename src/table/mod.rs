//! Tabular accessor over raw spreadsheet records.
//!
//! This module turns a heterogeneous labeled table into a row/column
//! addressable numeric grid that is safe to feed into the forecast pipeline.
//!
//! Design goals:
//! - **Graceful cell coercion**: a malformed cell becomes the NaN missing
//!   sentinel, never an error (downstream statistics skip non-finite values)
//! - **Flexible key resolution** for interactive use: whole table, column
//!   slices, row slices, or a single cell from a row/column pair in either
//!   order
//! - **Deterministic behavior**: ambiguous lookups resolve first-match-wins,
//!   never randomly
//! - **Separation of concerns**: no date math here beyond date-column
//!   discovery; no fetching logic (see [`source`])

use nalgebra::DMatrix;

use crate::dates::normalize_dates;
use crate::domain::Series;
use crate::error::Error;

pub mod source;

/// Column holding static metadata rather than time-series data.
///
/// Row slices exclude it so a metric row comes back as numbers only.
const METRIC_COLUMN: &str = "Metric";

/// Raw labeled records as supplied by an external source.
///
/// The first header names the label column; its cells become row labels and
/// it is removed from the data columns.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A lookup key for [`Sheet::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetKey {
    /// The whole table.
    All,
    /// A single label; resolved as a column first, then as a row.
    Single(String),
    /// An ordered list of column labels.
    Columns(Vec<String>),
    /// A row/column pair, order not fixed. The first element that matches a
    /// column label takes the column role (first-match-wins).
    Pair(String, String),
}

/// The result of a key resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Table(DMatrix<f64>),
    Columns { labels: Vec<String>, values: DMatrix<f64> },
    Row { label: String, columns: Vec<String>, values: Vec<f64> },
    Cell(f64),
}

/// A row/column-labeled numeric table.
///
/// All data cells are numeric-or-missing after construction; row labels need
/// not be unique (ambiguous labels resolve to the first match).
#[derive(Debug, Clone)]
pub struct Sheet {
    row_labels: Vec<String>,
    columns: Vec<String>,
    data: DMatrix<f64>,
}

impl Sheet {
    /// Build a sheet from raw records.
    ///
    /// The first column's values become row labels; every remaining cell is
    /// coerced with [`to_float`], malformed cells becoming NaN. Short rows
    /// are padded with NaN.
    pub fn new(table: &RawTable) -> Result<Self, Error> {
        if table.headers.is_empty() {
            return Err(Error::Precondition(
                "Cannot build a sheet from a table with no columns.".to_string(),
            ));
        }

        let columns: Vec<String> = table.headers[1..].to_vec();
        let mut row_labels = Vec::with_capacity(table.rows.len());
        let mut data = DMatrix::from_element(table.rows.len(), columns.len(), f64::NAN);

        for (i, row) in table.rows.iter().enumerate() {
            row_labels.push(row.first().cloned().unwrap_or_default());
            for j in 0..columns.len() {
                if let Some(cell) = row.get(j + 1) {
                    data[(i, j)] = to_float(cell);
                }
            }
        }

        Ok(Sheet {
            row_labels,
            columns,
            data,
        })
    }

    /// Data column labels, in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row labels, in table order (not necessarily unique).
    pub fn rows(&self) -> &[String] {
        &self.row_labels
    }

    /// Resolve a flexible lookup key.
    ///
    /// - `All` returns the whole table.
    /// - `Columns` returns the named column slices (all rows).
    /// - `Single` returns the column slice when the label names a column,
    ///   else the row across all columns except the reserved `"Metric"`
    ///   metadata column.
    /// - `Pair` identifies the column-role element first-match-wins and
    ///   returns the scalar at the row/column intersection (first matching
    ///   row when labels repeat).
    ///
    /// Anything unresolvable fails with [`Error::KeyResolution`].
    pub fn resolve(&self, key: &SheetKey) -> Result<Resolved, Error> {
        match key {
            SheetKey::All => Ok(Resolved::Table(self.data.clone())),
            SheetKey::Columns(labels) => {
                let mut values = DMatrix::zeros(self.data.nrows(), labels.len());
                for (slot, label) in labels.iter().enumerate() {
                    let idx = self
                        .column_index(label)
                        .ok_or_else(|| self.unresolvable(label))?;
                    values.set_column(slot, &self.data.column(idx));
                }
                Ok(Resolved::Columns {
                    labels: labels.clone(),
                    values,
                })
            }
            SheetKey::Single(label) => {
                if let Some(idx) = self.column_index(label) {
                    let mut values = DMatrix::zeros(self.data.nrows(), 1);
                    values.set_column(0, &self.data.column(idx));
                    return Ok(Resolved::Columns {
                        labels: vec![label.clone()],
                        values,
                    });
                }
                if let Some(row) = self.row_index(label) {
                    let (columns, values) = self.row_without_metric(row);
                    return Ok(Resolved::Row {
                        label: label.clone(),
                        columns,
                        values,
                    });
                }
                Err(self.unresolvable(label))
            }
            SheetKey::Pair(first, second) => {
                // First-match-wins: if `first` names a column it takes the
                // column role even when `second` would match one too.
                let (column_key, row_key) = if self.column_index(first).is_some() {
                    (first, second)
                } else {
                    (second, first)
                };
                let col = self
                    .column_index(column_key)
                    .ok_or_else(|| self.unresolvable(&format!("({first}, {second})")))?;
                let row = self
                    .row_index(row_key)
                    .ok_or_else(|| self.unresolvable(&format!("({first}, {second})")))?;
                Ok(Resolved::Cell(self.data[(row, col)]))
            }
        }
    }

    /// Column slice by label.
    pub fn column(&self, label: &str) -> Result<Vec<f64>, Error> {
        let idx = self.column_index(label).ok_or_else(|| self.unresolvable(label))?;
        Ok(self.data.column(idx).iter().copied().collect())
    }

    /// Row slice by label, excluding the `"Metric"` metadata column.
    pub fn row(&self, label: &str) -> Result<Vec<f64>, Error> {
        match self.resolve(&SheetKey::Single(label.to_string()))? {
            Resolved::Row { values, .. } => Ok(values),
            // A label that is both a column and a row resolves as a column;
            // force the row view here.
            _ => {
                let row = self.row_index(label).ok_or_else(|| self.unresolvable(label))?;
                Ok(self.row_without_metric(row).1)
            }
        }
    }

    /// Scalar at a row/column intersection, pair order not fixed.
    pub fn cell(&self, a: &str, b: &str) -> Result<f64, Error> {
        match self.resolve(&SheetKey::Pair(a.to_string(), b.to_string()))? {
            Resolved::Cell(v) => Ok(v),
            _ => Err(self.unresolvable(&format!("({a}, {b})"))),
        }
    }

    /// Column labels holding historical time-series values.
    ///
    /// A column is a date column when, after normalizing `/` separators to
    /// `-`, its label starts with a `DD-MM-YY`-shaped prefix. Prefix matching
    /// keeps annotated labels (e.g. `"12-31-24 E"`) discoverable.
    pub fn date_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| is_date_label(c))
            .cloned()
            .collect()
    }

    /// Reduce a metric row to a chronologically-ordered series.
    ///
    /// Row lookup + date-column discovery + date normalization in one step.
    pub fn to_series(&self, row_label: &str) -> Result<Series, Error> {
        let row = self
            .row_index(row_label)
            .ok_or_else(|| self.unresolvable(row_label))?;

        let date_cols = self.date_columns();
        let dates = normalize_dates(&date_cols)?;

        let pairs = date_cols.iter().zip(dates).map(|(label, date)| {
            // Date columns are a subset of data columns; the index lookup
            // cannot miss.
            let idx = self.column_index(label).unwrap_or(0);
            (date, self.data[(row, idx)])
        });

        Ok(Series::from_pairs(pairs))
    }

    fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    fn row_index(&self, label: &str) -> Option<usize> {
        self.row_labels.iter().position(|r| r == label)
    }

    fn row_without_metric(&self, row: usize) -> (Vec<String>, Vec<f64>) {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (j, label) in self.columns.iter().enumerate() {
            if label != METRIC_COLUMN {
                columns.push(label.clone());
                values.push(self.data[(row, j)]);
            }
        }
        (columns, values)
    }

    fn unresolvable(&self, key: &str) -> Error {
        Error::KeyResolution(format!("Unable to resolve index {key} in sheet."))
    }
}

/// Coerce a cell to a numeric value.
///
/// Percentage strings (`"12.5%"`) become their decimal fraction; anything
/// that fails to parse becomes the NaN missing sentinel.
pub fn to_float(cell: &str) -> f64 {
    let s = cell.trim();
    if let Some(stripped) = s.strip_suffix('%') {
        return match stripped.trim().parse::<f64>() {
            Ok(v) => v / 100.0,
            Err(_) => f64::NAN,
        };
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// `DD-MM-YY`-like prefix check after `/` → `-` normalization.
fn is_date_label(label: &str) -> bool {
    let normalized = label.replace('/', "-");
    let b = normalized.as_bytes();
    b.len() >= 8
        && b[0].is_ascii_digit()
        && b[1].is_ascii_digit()
        && b[2] == b'-'
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit()
        && b[5] == b'-'
        && b[6].is_ascii_digit()
        && b[7].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn revenue_sheet() -> Sheet {
        let table = RawTable {
            headers: vec![
                "Item".to_string(),
                "Metric".to_string(),
                "12-31-22".to_string(),
                "12-31-23".to_string(),
            ],
            rows: vec![
                vec!["Revenue".to_string(), "1".to_string(), "100.0".to_string(), "120.0".to_string()],
                vec!["Margin".to_string(), "2".to_string(), "12.5%".to_string(), "n/a".to_string()],
            ],
        };
        Sheet::new(&table).unwrap()
    }

    #[test]
    fn construction_coerces_cells() {
        let sheet = revenue_sheet();
        assert_eq!(sheet.cell("Margin", "12-31-22").unwrap(), 0.125);
        assert!(sheet.cell("Margin", "12-31-23").unwrap().is_nan());
    }

    #[test]
    fn single_key_prefers_columns() {
        let sheet = revenue_sheet();
        match sheet.resolve(&SheetKey::Single("12-31-22".to_string())).unwrap() {
            Resolved::Columns { labels, values } => {
                assert_eq!(labels, vec!["12-31-22".to_string()]);
                assert_eq!(values.nrows(), 2);
                assert_eq!(values[(0, 0)], 100.0);
            }
            other => panic!("expected column slice, got {other:?}"),
        }
    }

    #[test]
    fn row_lookup_excludes_metric_column() {
        let sheet = revenue_sheet();
        match sheet.resolve(&SheetKey::Single("Revenue".to_string())).unwrap() {
            Resolved::Row { columns, values, .. } => {
                assert_eq!(columns, vec!["12-31-22".to_string(), "12-31-23".to_string()]);
                assert_eq!(values, vec![100.0, 120.0]);
            }
            other => panic!("expected row slice, got {other:?}"),
        }
    }

    #[test]
    fn column_and_row_conveniences() {
        let sheet = revenue_sheet();
        assert_eq!(sheet.column("12-31-22").unwrap(), vec![100.0, 0.125]);
        assert_eq!(sheet.row("Revenue").unwrap(), vec![100.0, 120.0]);
        assert!(matches!(sheet.column("nope"), Err(Error::KeyResolution(_))));
    }

    #[test]
    fn pair_key_resolves_in_either_order() {
        let sheet = revenue_sheet();
        assert_eq!(sheet.cell("Revenue", "12-31-22").unwrap(), 100.0);
        assert_eq!(sheet.cell("12-31-22", "Revenue").unwrap(), 100.0);
    }

    #[test]
    fn pair_key_first_match_wins_for_the_column_role() {
        // Both elements name columns: the first takes the column role, so
        // the second is treated as a (missing) row label.
        let sheet = revenue_sheet();
        let err = sheet.cell("12-31-22", "12-31-23").unwrap_err();
        assert!(matches!(err, Error::KeyResolution(_)));
    }

    #[test]
    fn unknown_keys_fail_with_key_resolution() {
        let sheet = revenue_sheet();
        assert!(matches!(
            sheet.resolve(&SheetKey::Single("EBITDA".to_string())),
            Err(Error::KeyResolution(_))
        ));
        assert!(matches!(
            sheet.resolve(&SheetKey::Columns(vec!["nope".to_string()])),
            Err(Error::KeyResolution(_))
        ));
    }

    #[test]
    fn duplicate_row_labels_resolve_to_the_first_match() {
        let table = RawTable {
            headers: vec!["Item".to_string(), "12-31-22".to_string()],
            rows: vec![
                vec!["Revenue".to_string(), "1.0".to_string()],
                vec!["Revenue".to_string(), "2.0".to_string()],
            ],
        };
        let sheet = Sheet::new(&table).unwrap();
        assert_eq!(sheet.cell("Revenue", "12-31-22").unwrap(), 1.0);
    }

    #[test]
    fn date_columns_normalize_separators_and_allow_annotations() {
        let table = RawTable {
            headers: vec![
                "Item".to_string(),
                "Metric".to_string(),
                "12/31/22".to_string(),
                "12-31-24 E".to_string(),
                "Notes".to_string(),
            ],
            rows: vec![],
        };
        let sheet = Sheet::new(&table).unwrap();
        assert_eq!(
            sheet.date_columns(),
            vec!["12/31/22".to_string(), "12-31-24 E".to_string()]
        );
    }

    #[test]
    fn to_series_orders_by_normalized_date() {
        let table = RawTable {
            headers: vec![
                "Item".to_string(),
                "12-31-23".to_string(),
                "12/31/22".to_string(),
            ],
            rows: vec![vec!["Revenue".to_string(), "120.0".to_string(), "100.0".to_string()]],
        };
        let sheet = Sheet::new(&table).unwrap();
        let series = sheet.to_series("Revenue").unwrap();
        assert_eq!(series.values(), vec![100.0, 120.0]);
        assert_eq!(
            series.dates(),
            vec![
                NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn to_float_coercion() {
        assert_eq!(to_float("12.5%"), 0.125);
        assert_eq!(to_float(" 3.5 "), 3.5);
        assert!(to_float("n/a").is_nan());
        assert!(to_float("").is_nan());
    }
}
