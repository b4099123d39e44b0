//! Record sources: where raw tables come from.
//!
//! The core never talks to a spreadsheet service or holds credentials; it
//! consumes a [`RecordSource`] that yields named raw tables. The shipped
//! implementation reads CSV files, which is what the `fbands` binary and the
//! tests use. A hosted-spreadsheet client can implement the same trait
//! without touching the core.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::table::{RawTable, Sheet};

/// An external supplier of named raw tables.
pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<(String, RawTable)>, Error>;
}

/// Build a sheet per named table from a source.
pub fn load_sheets(source: &dyn RecordSource) -> Result<BTreeMap<String, Sheet>, Error> {
    let mut sheets = BTreeMap::new();
    for (name, table) in source.fetch()? {
        sheets.insert(name, Sheet::new(&table)?);
    }
    Ok(sheets)
}

/// A single-table source backed by a CSV file.
///
/// The table name is the file stem (e.g. `income.csv` → `"income"`).
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sheet".to_string())
    }
}

impl RecordSource for CsvSource {
    fn fetch(&self) -> Result<Vec<(String, RawTable)>, Error> {
        let file = File::open(&self.path)
            .map_err(|e| Error::Io(format!("Failed to open CSV '{}': {e}", self.path.display())))?;
        let table = parse_records(file)?;
        Ok(vec![(self.name(), table)])
    }
}

/// Parse CSV records into a raw table.
///
/// Flexible row lengths are allowed (short rows are padded to missing at
/// sheet construction); cells are trimmed.
pub fn parse_records<R: Read>(reader: R) -> Result<RawTable, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::Io(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Io(format!("CSV parse error: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}
