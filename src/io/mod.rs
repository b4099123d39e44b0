//! Read/write forecast bundle JSON files.
//!
//! Bundle JSON is the portable representation of one assembled forecast:
//! the credibility bands, the expected trace (with its marker-opacity
//! vector), and the realized/analyst overlays. It can be reloaded later for
//! re-rendering or downstream analysis without re-simulating.

use std::fs::File;
use std::path::Path;

use crate::error::Error;
use crate::forecast::ForecastBundle;

/// Write a bundle JSON file.
pub fn write_bundle_json(path: &Path, bundle: &ForecastBundle) -> Result<(), Error> {
    let file = File::create(path)
        .map_err(|e| Error::Io(format!("Failed to create bundle JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, bundle)
        .map_err(|e| Error::Io(format!("Failed to write bundle JSON: {e}")))?;

    Ok(())
}

/// Read a bundle JSON file.
pub fn read_bundle_json(path: &Path) -> Result<ForecastBundle, Error> {
    let file = File::open(path)
        .map_err(|e| Error::Io(format!("Failed to open bundle JSON '{}': {e}", path.display())))?;
    let bundle: ForecastBundle =
        serde_json::from_reader(file).map_err(|e| Error::Io(format!("Invalid bundle JSON: {e}")))?;
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist::TimeSeriesDistribution;
    use crate::domain::Series;
    use chrono::NaiveDate;
    use nalgebra::DMatrix;

    #[test]
    fn bundle_json_roundtrips_in_memory() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let dist = TimeSeriesDistribution::from_matrix(DMatrix::from_element(20, 2, 110.0));
        let realized = Series::from_pairs([(d(2024, 6, 30), 100.0)]);
        let bundle = ForecastBundle::build(
            &dist,
            &[d(2025, 12, 31), d(2026, 12, 31)],
            Some(&realized),
            None,
            "Revenue",
        )
        .unwrap();

        let json = serde_json::to_string(&bundle).unwrap();
        let back: ForecastBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bundle);
    }
}
