//! Domain value types shared across the pipeline.
//!
//! Everything here is an owned, immutable value: created once from inputs,
//! never mutated in place. Operations that look like mutation (the continuity
//! stitch, for example) return a new value instead.

pub mod series;

pub use series::{Series, SeriesPoint};
