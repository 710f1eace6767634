// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sequential CPU baselines for every GPU reduction and the sort.
//!
//! Used by `validate_stats_gpu` and the GPU integration tests to
//! cross-check device results. Accumulation is in f64 to match the
//! host-side combine phase of the GPU path.

use crate::error::{Error, Result};

/// Arithmetic mean, f64 accumulation.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty slice.
pub fn mean(data: &[f32]) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::Config("mean of an empty sequence".into()));
    }
    let sum: f64 = data.iter().copied().map(f64::from).sum();
    Ok(sum / data.len() as f64)
}

/// Elementwise minimum and maximum.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty slice.
pub fn min_max(data: &[f32]) -> Result<(f32, f32)> {
    if data.is_empty() {
        return Err(Error::Config("min/max of an empty sequence".into()));
    }
    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    Ok((min, max))
}

/// Population variance Σ(x − mean)² / n.
#[must_use]
pub fn variance(data: &[f32], mean: f64) -> f64 {
    let ssd: f64 = data
        .iter()
        .map(|&x| {
            let d = f64::from(x) - mean;
            d * d
        })
        .sum();
    ssd / data.len() as f64
}

/// Population standard deviation √variance.
#[must_use]
pub fn std_dev(data: &[f32], mean: f64) -> f64 {
    variance(data, mean).sqrt()
}

/// Ascending sorted copy (IEEE 754 total order).
#[must_use]
pub fn sorted(data: &[f32]) -> Vec<f32> {
    let mut out = data.to_vec();
    out.sort_unstable_by(f32::total_cmp);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_worked_example() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert!((mean(&data).unwrap() - 3.875).abs() < 1e-12);
    }

    #[test]
    fn mean_empty_rejected() {
        assert!(matches!(mean(&[]), Err(Error::Config(_))));
    }

    #[test]
    fn min_max_all_negative() {
        let (min, max) = min_max(&[-5.0, -1.0, -9.0]).unwrap();
        assert_eq!((min, max), (-9.0, -1.0));
    }

    #[test]
    fn min_max_empty_rejected() {
        assert!(matches!(min_max(&[]), Err(Error::Config(_))));
    }

    #[test]
    fn std_dev_is_sqrt_of_variance() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0];
        let m = mean(&data).unwrap();
        assert_eq!(std_dev(&data, m), variance(&data, m).sqrt());
    }

    #[test]
    fn sorted_is_monotone_permutation() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let s = sorted(&data);
        assert_eq!(s, vec![1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0]);
    }
}
