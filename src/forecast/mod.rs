//! Forecast series construction.
//!
//! This is where the three data kinds meet: a simulated
//! [`TimeSeriesDistribution`](crate::dist::TimeSeriesDistribution) is reduced
//! to percentile bands and an expected trace, continuity-stitched against
//! realized history, and bundled with the realized/analyst overlays for an
//! external renderer.

pub mod builder;
pub mod stats;

pub use builder::{
    CredibilityBand, ExpectedTrace, ForecastBundle, CREDIBILITY_LEVELS,
};
