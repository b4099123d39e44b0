//! Sampled distributions.
//!
//! This module defines:
//!
//! - [`SampledValue`]: a numeric container over Monte-Carlo draws with
//!   elementwise arithmetic and NumPy-style broadcasting
//! - [`TimeSeriesDistribution`]: a `(samples x periods)` specialization with
//!   explicit construction paths and parametric sampling across periods

pub mod sampled;
pub mod time_series;

pub use sampled::SampledValue;
pub use time_series::{Param, TimeSeriesDistribution};
