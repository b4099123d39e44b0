//! `forecast-bands` library crate.
//!
//! Combines three kinds of time-indexed financial data — realized history,
//! Monte-Carlo forecast distributions, and analyst point estimates — into
//! aligned series ready for rendering: percentile credibility bands, an
//! expected trace, and a continuity-stitched overlay.
//!
//! The binary (`fbands`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., notebooks, services, other front-ends)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod dates;
pub mod dist;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod plot;
pub mod table;
