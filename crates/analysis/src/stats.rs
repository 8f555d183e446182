//! Quantile statistics for cross-campaign outlier detection.

use std::cmp::Ordering;

/// Interpolated-rank quantile over a sorted slice: linear interpolation
/// between the closest ranks at position `q * (n - 1)`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Tukey fences at 1.5×IQR: `[Q1 - 1.5·IQR, Q3 + 1.5·IQR]`.
/// Returns `None` for populations of fewer than two values.
pub fn iqr_bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
