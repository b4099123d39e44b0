//! Sampled-value algebra.
//!
//! A [`SampledValue`] holds an owned 2-D grid of Monte-Carlo draws with shape
//! `(num_samples, num_periods >= 1)`. Arithmetic between two values, or
//! between a value and a scalar, is elementwise under standard 2-D
//! broadcasting rules and always returns a new value, never a mutation of an
//! operand.
//!
//! Shape-mismatch behavior follows the underlying numeric engine: combining
//! two grids whose dimensions are neither equal nor 1 panics, exactly as
//! nalgebra's own dimension checks would.

use std::ops::{Add, Div, Mul, Sub};

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::Error;

/// An owned 2-D grid of sampled draws, shape `(num_samples, num_periods)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledValue {
    values: DMatrix<f64>,
}

impl SampledValue {
    /// Wrap an existing `(samples x periods)` grid.
    pub fn from_matrix(values: DMatrix<f64>) -> Self {
        SampledValue { values }
    }

    /// Build a one-period value from a flat list of draws.
    ///
    /// The draws are stored as an `(n, 1)` column so that the value is
    /// genuinely 2-D; `shape()` on the result is always `(n, 1)`.
    pub fn from_samples(samples: &[f64]) -> Self {
        SampledValue {
            values: DMatrix::from_column_slice(samples.len(), 1, samples),
        }
    }

    /// One period of normal draws: `N(mean, std)`, shape `(num_samples, 1)`.
    pub fn normal(mean: f64, std: f64, num_samples: usize, rng: &mut StdRng) -> Result<Self, Error> {
        if num_samples == 0 {
            return Err(Error::Precondition("Sample count must be > 0.".to_string()));
        }
        // `Normal::new` accepts a negative std_dev (reflected distribution);
        // this domain treats it as invalid.
        if !(mean.is_finite() && std.is_finite() && std >= 0.0) {
            return Err(Error::Precondition(format!(
                "Invalid normal parameters: mean={mean}, std={std} (must be finite, std >= 0)."
            )));
        }
        let dist = Normal::new(mean, std)
            .map_err(|e| Error::Precondition(format!("Invalid normal parameters: {e}")))?;
        let draws: Vec<f64> = (0..num_samples).map(|_| dist.sample(rng)).collect();
        Ok(SampledValue::from_samples(&draws))
    }

    /// One period of uniform draws on `[lower, upper)`, shape `(num_samples, 1)`.
    pub fn uniform(lower: f64, upper: f64, num_samples: usize, rng: &mut StdRng) -> Result<Self, Error> {
        if num_samples == 0 {
            return Err(Error::Precondition("Sample count must be > 0.".to_string()));
        }
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(Error::Precondition(format!(
                "Invalid uniform bounds: lower={lower}, upper={upper} (must be finite, lower < upper)."
            )));
        }
        let draws: Vec<f64> = (0..num_samples).map(|_| rng.gen_range(lower..upper)).collect();
        Ok(SampledValue::from_samples(&draws))
    }

    /// `(num_samples, num_periods)` dimension tuple.
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Borrow the underlying grid.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Consume self, returning the underlying grid.
    pub fn into_matrix(self) -> DMatrix<f64> {
        self.values
    }

    /// Elementwise combination with a scalar; returns a new value.
    fn zip_scalar(&self, rhs: f64, f: impl Fn(f64, f64) -> f64) -> SampledValue {
        SampledValue {
            values: self.values.map(|v| f(v, rhs)),
        }
    }

    /// Elementwise combination of two grids under 2-D broadcasting.
    ///
    /// Per dimension, sizes must be equal or one of them 1; the output takes
    /// the larger size. Incompatible shapes panic (the engine's natural
    /// dimension-mismatch behavior, propagated unchanged).
    fn zip_broadcast(&self, rhs: &SampledValue, f: impl Fn(f64, f64) -> f64) -> SampledValue {
        let (lr, lc) = self.values.shape();
        let (rr, rc) = rhs.values.shape();
        let rows = broadcast_dim(lr, rr, "rows");
        let cols = broadcast_dim(lc, rc, "columns");

        let values = DMatrix::from_fn(rows, cols, |i, j| {
            let a = self.values[(if lr == 1 { 0 } else { i }, if lc == 1 { 0 } else { j })];
            let b = rhs.values[(if rr == 1 { 0 } else { i }, if rc == 1 { 0 } else { j })];
            f(a, b)
        });
        SampledValue { values }
    }
}

fn broadcast_dim(a: usize, b: usize, which: &str) -> usize {
    if a == b || b == 1 {
        a
    } else if a == 1 {
        b
    } else {
        panic!("Broadcast shape mismatch on {which}: {a} vs {b}");
    }
}

macro_rules! impl_sampled_binop {
    ($trait:ident, $method:ident, $f:expr) => {
        impl $trait<&SampledValue> for &SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: &SampledValue) -> SampledValue {
                self.zip_broadcast(rhs, $f)
            }
        }

        impl $trait<SampledValue> for SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: SampledValue) -> SampledValue {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&SampledValue> for SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: &SampledValue) -> SampledValue {
                (&self).$method(rhs)
            }
        }

        impl $trait<SampledValue> for &SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: SampledValue) -> SampledValue {
                self.$method(&rhs)
            }
        }

        impl $trait<f64> for &SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: f64) -> SampledValue {
                self.zip_scalar(rhs, $f)
            }
        }

        impl $trait<f64> for SampledValue {
            type Output = SampledValue;
            fn $method(self, rhs: f64) -> SampledValue {
                (&self).$method(rhs)
            }
        }
    };
}

impl_sampled_binop!(Add, add, |a, b| a + b);
impl_sampled_binop!(Sub, sub, |a, b| a - b);
impl_sampled_binop!(Mul, mul, |a, b| a * b);
impl_sampled_binop!(Div, div, |a, b| a / b);

// Reversed scalar forms for the commutative operations, so `s * value` and
// `value * s` are interchangeable (likewise for addition).
macro_rules! impl_scalar_lhs {
    ($trait:ident, $method:ident) => {
        impl $trait<&SampledValue> for f64 {
            type Output = SampledValue;
            fn $method(self, rhs: &SampledValue) -> SampledValue {
                rhs.$method(self)
            }
        }

        impl $trait<SampledValue> for f64 {
            type Output = SampledValue;
            fn $method(self, rhs: SampledValue) -> SampledValue {
                (&rhs).$method(self)
            }
        }
    };
}

impl_scalar_lhs!(Add, add);
impl_scalar_lhs!(Mul, mul);
