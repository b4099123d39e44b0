//! Time-series distributions.
//!
//! A [`TimeSeriesDistribution`] is a `(num_samples x num_periods)` grid of
//! Monte-Carlo draws: one simulated sample path per row, one forecast period
//! per column. The three construction paths are distinct factories rather
//! than one argument-type-dispatching constructor:
//!
//! - [`TimeSeriesDistribution::from_matrix`]: adopt an existing grid
//! - [`TimeSeriesDistribution::from_sampled`]: copy another sampled value
//! - [`TimeSeriesDistribution::from_sampler`]: fill a grid from a draw
//!   function plus scalar/per-period parameters
//!
//! Sampling is deterministic given a seeded `StdRng` (no hidden randomness).

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::dist::sampled::SampledValue;
use crate::error::Error;

/// A sampling-function parameter: constant across periods, or one value per
/// period.
///
/// A per-period parameter fixes the period count of the distribution it is
/// used to construct; mixing per-period parameters of different lengths (or a
/// length that disagrees with an explicit period count) is a construction
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Scalar(f64),
    PerPeriod(Vec<f64>),
}

impl Param {
    /// Number of periods this parameter implies, if any.
    fn period_len(&self) -> Option<usize> {
        match self {
            Param::Scalar(_) => None,
            Param::PerPeriod(v) => Some(v.len()),
        }
    }

    /// Value of this parameter at `period` (scalars broadcast to every
    /// period).
    ///
    /// Callers must have validated per-period lengths against the effective
    /// period count; indexing past a validated length cannot happen.
    fn at(&self, period: usize) -> f64 {
        match self {
            Param::Scalar(v) => *v,
            Param::PerPeriod(v) => v[period],
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Scalar(value)
    }
}

impl From<Vec<f64>> for Param {
    fn from(values: Vec<f64>) -> Self {
        Param::PerPeriod(values)
    }
}

/// A sampled distribution spread across forecast periods.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesDistribution {
    values: SampledValue,
    num_samples: usize,
    num_periods: usize,
}

impl TimeSeriesDistribution {
    /// Adopt an existing `(samples x periods)` grid.
    pub fn from_matrix(values: DMatrix<f64>) -> Self {
        let (num_samples, num_periods) = values.shape();
        TimeSeriesDistribution {
            values: SampledValue::from_matrix(values),
            num_samples,
            num_periods,
        }
    }

    /// Copy an existing sampled value's draws and shape.
    pub fn from_sampled(value: &SampledValue) -> Self {
        let (num_samples, num_periods) = value.shape();
        TimeSeriesDistribution {
            values: value.clone(),
            num_samples,
            num_periods,
        }
    }

    /// Fill a `(num_samples x num_periods)` grid from a draw function.
    ///
    /// The effective period count is the explicit `num_periods` if given,
    /// else the longest per-period parameter's length, else 1. An explicit
    /// count that disagrees with a per-period parameter's length fails with
    /// [`Error::ShapeMismatch`] before anything is sampled.
    ///
    /// `draw` receives the parameters resolved for one period (scalars
    /// broadcast across periods) and produces a single draw; it is called
    /// once per cell of the grid.
    pub fn from_sampler<F>(
        num_samples: usize,
        params: &[Param],
        num_periods: Option<usize>,
        rng: &mut StdRng,
        mut draw: F,
    ) -> Result<Self, Error>
    where
        F: FnMut(&mut StdRng, &[f64]) -> Result<f64, Error>,
    {
        if num_samples == 0 {
            return Err(Error::Precondition("Sample count must be > 0.".to_string()));
        }

        let max_len = params.iter().filter_map(Param::period_len).max();

        let num_periods = match (max_len, num_periods) {
            (Some(len), Some(n)) if len != n => {
                return Err(Error::ShapeMismatch(format!(
                    "Expected per-period parameters and num_periods to have same dimensions \
                     (parameter length {len}, num_periods {n})."
                )));
            }
            (_, Some(n)) => n,
            (Some(len), None) => len,
            (None, None) => 1,
        };

        // All per-period parameters must span the effective period count,
        // not just the longest one.
        for p in params {
            if let Some(len) = p.period_len() {
                if len != num_periods {
                    return Err(Error::ShapeMismatch(format!(
                        "Expected per-period parameters and num_periods to have same dimensions \
                         (parameter length {len}, num_periods {num_periods})."
                    )));
                }
            }
        }

        let mut resolved = vec![0.0; params.len()];
        let mut values = DMatrix::zeros(num_samples, num_periods);
        for period in 0..num_periods {
            for (slot, p) in resolved.iter_mut().zip(params.iter()) {
                *slot = p.at(period);
            }
            for sample in 0..num_samples {
                values[(sample, period)] = draw(rng, &resolved)?;
            }
        }

        Ok(TimeSeriesDistribution::from_matrix(values))
    }

    /// Normal draws with scalar or per-period `mean` / `std`.
    pub fn normal(
        num_samples: usize,
        mean: impl Into<Param>,
        std: impl Into<Param>,
        num_periods: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<Self, Error> {
        let params = [mean.into(), std.into()];
        Self::from_sampler(num_samples, &params, num_periods, rng, |rng, p| {
            let (mean, std) = (p[0], p[1]);
            // `Normal::new` accepts a negative std_dev (reflected
            // distribution); this domain treats it as invalid.
            if !(mean.is_finite() && std.is_finite() && std >= 0.0) {
                return Err(Error::Precondition(format!(
                    "Invalid normal parameters: mean={mean}, std={std} (must be finite, std >= 0)."
                )));
            }
            let dist = Normal::new(mean, std)
                .map_err(|e| Error::Precondition(format!("Invalid normal parameters: {e}")))?;
            Ok(dist.sample(rng))
        })
    }

    /// Uniform draws on `[lower, upper)` with scalar or per-period bounds.
    pub fn uniform(
        num_samples: usize,
        lower: impl Into<Param>,
        upper: impl Into<Param>,
        num_periods: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<Self, Error> {
        let params = [lower.into(), upper.into()];
        Self::from_sampler(num_samples, &params, num_periods, rng, |rng, p| {
            let (lower, upper) = (p[0], p[1]);
            if !(lower.is_finite() && upper.is_finite() && lower < upper) {
                return Err(Error::Precondition(format!(
                    "Invalid uniform bounds: lower={lower}, upper={upper} (must be finite, lower < upper)."
                )));
            }
            use rand::Rng;
            Ok(rng.gen_range(lower..upper))
        })
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// The whole `(samples x periods)` grid.
    pub fn values(&self) -> &DMatrix<f64> {
        self.values.values()
    }

    /// Borrow the underlying sampled value (for algebra with other values).
    pub fn as_sampled(&self) -> &SampledValue {
        &self.values
    }

    /// The full sample column for one period.
    ///
    /// Fails with [`Error::Precondition`] when `period` is out of range.
    pub fn values_at(&self, period: usize) -> Result<DVector<f64>, Error> {
        if period >= self.num_periods {
            return Err(Error::Precondition(format!(
                "Period {period} out of range (distribution has {} periods).",
                self.num_periods
            )));
        }
        Ok(self.values.values().column(period).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn from_matrix_infers_shape() {
        let d = TimeSeriesDistribution::from_matrix(DMatrix::zeros(50, 3));
        assert_eq!(d.num_samples(), 50);
        assert_eq!(d.num_periods(), 3);
    }

    #[test]
    fn from_sampled_copies_values_and_shape() {
        let v = SampledValue::from_samples(&[1.0, 2.0, 3.0]);
        let d = TimeSeriesDistribution::from_sampled(&v);
        assert_eq!(d.num_samples(), 3);
        assert_eq!(d.num_periods(), 1);
        assert_eq!(d.values(), v.values());
    }

    #[test]
    fn period_count_inferred_from_longest_per_period_parameter() {
        let mut rng = StdRng::seed_from_u64(7);
        let means = vec![100.0, 110.0, 120.0, 130.0, 140.0];
        let d = TimeSeriesDistribution::normal(200, means, 1.0, None, &mut rng).unwrap();
        assert_eq!(d.num_periods(), 5);
        assert_eq!(d.num_samples(), 200);
        assert_eq!(d.values().shape(), (200, 5));
    }

    #[test]
    fn explicit_period_count_must_match_parameter_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let means = vec![100.0, 110.0, 120.0, 130.0, 140.0];
        let err = TimeSeriesDistribution::normal(200, means, 1.0, Some(4), &mut rng).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn scalar_parameters_default_to_one_period() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = TimeSeriesDistribution::normal(10, 0.0, 1.0, None, &mut rng).unwrap();
        assert_eq!(d.num_periods(), 1);
    }

    #[test]
    fn scalar_parameter_broadcasts_across_explicit_periods() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = TimeSeriesDistribution::uniform(10, 0.0, 1.0, Some(4), &mut rng).unwrap();
        assert_eq!(d.values().shape(), (10, 4));
        assert!(d.values().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn per_period_parameters_shift_each_column() {
        let mut rng = StdRng::seed_from_u64(11);
        let means = vec![0.0, 1000.0];
        let d = TimeSeriesDistribution::normal(500, means, 1.0, None, &mut rng).unwrap();
        let p0 = d.values_at(0).unwrap();
        let p1 = d.values_at(1).unwrap();
        let mean0 = p0.iter().sum::<f64>() / p0.len() as f64;
        let mean1 = p1.iter().sum::<f64>() / p1.len() as f64;
        assert!(mean0.abs() < 1.0);
        assert!((mean1 - 1000.0).abs() < 1.0);
    }

    #[test]
    fn negative_or_non_finite_std_fails_fast() {
        let mut rng = StdRng::seed_from_u64(7);
        let err =
            TimeSeriesDistribution::normal(10, 0.0, vec![1.0, -1.0], None, &mut rng).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(TimeSeriesDistribution::normal(10, 0.0, f64::NAN, None, &mut rng).is_err());
    }

    #[test]
    fn mismatched_per_period_parameters_fail() {
        let mut rng = StdRng::seed_from_u64(7);
        let err =
            TimeSeriesDistribution::normal(10, vec![0.0, 1.0, 2.0], vec![1.0, 1.0], None, &mut rng)
                .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn values_at_rejects_out_of_range_periods() {
        let d = TimeSeriesDistribution::from_matrix(DMatrix::zeros(5, 2));
        assert!(d.values_at(2).is_err());
        assert_eq!(d.values_at(1).unwrap().len(), 5);
    }
}
