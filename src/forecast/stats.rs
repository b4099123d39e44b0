//! Sample statistics over one forecast period's draws.
//!
//! Missing values (the table layer's NaN sentinel) are skipped, not treated
//! as zero: a column that is partly missing still yields a meaningful
//! percentile or mean, and a column with no finite values yields `None`.

/// Percentile of the finite values in `values`, with linear interpolation
/// between order statistics.
///
/// `p` is in `[0, 100]`. Returns `None` when no finite values remain.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p = p.clamp(0.0, 100.0);
    let rank = p / 100.0 * (finite.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(finite[lo]);
    }
    let frac = rank - lo as f64;
    Some(finite[lo] + frac * (finite[hi] - finite[lo]))
}

/// Mean of the finite values in `values`; `None` when no finite values
/// remain.
pub fn mean(values: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}
