// SPDX-License-Identifier: AGPL-3.0-or-later
//! Order statistics over a sorted, depadded sequence.
//!
//! Standard statistical convention throughout: an even-length sequence
//! averages its two central elements, an odd-length sequence takes the
//! single middle element. Quartiles split off lower and upper halves of
//! `floor(n/2)` elements each (the middle element is excluded for odd
//! n) and apply the same median rule to each half.

use crate::error::{Error, Result};

/// Median and quartiles of one sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderStats {
    /// First (lower) quartile.
    pub lower_quartile: f64,
    /// Median.
    pub median: f64,
    /// Third (upper) quartile.
    pub upper_quartile: f64,
}

/// Median of a sorted slice.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty slice.
pub fn median(sorted: &[f32]) -> Result<f64> {
    let n = sorted.len();
    if n == 0 {
        return Err(Error::Config("median of an empty sequence".into()));
    }
    debug_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    if n % 2 == 1 {
        Ok(f64::from(sorted[n / 2]))
    } else {
        Ok((f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0)
    }
}

/// Median and quartiles of a sorted slice.
///
/// A single-element sequence has median and both quartiles equal to
/// that element.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty slice.
pub fn order_statistics(sorted: &[f32]) -> Result<OrderStats> {
    let n = sorted.len();
    if n == 0 {
        return Err(Error::Config(
            "order statistics of an empty sequence".into(),
        ));
    }
    if n == 1 {
        let x = f64::from(sorted[0]);
        return Ok(OrderStats {
            lower_quartile: x,
            median: x,
            upper_quartile: x,
        });
    }

    let half = n / 2;
    Ok(OrderStats {
        lower_quartile: median(&sorted[..half])?,
        median: median(sorted)?,
        upper_quartile: median(&sorted[n - half..])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_config_error() {
        assert!(matches!(median(&[]), Err(Error::Config(_))));
        assert!(matches!(order_statistics(&[]), Err(Error::Config(_))));
    }

    #[test]
    fn single_element() {
        let stats = order_statistics(&[7.5]).unwrap();
        assert_eq!(stats.median, 7.5);
        assert_eq!(stats.lower_quartile, 7.5);
        assert_eq!(stats.upper_quartile, 7.5);
    }

    #[test]
    fn two_elements() {
        let stats = order_statistics(&[1.0, 3.0]).unwrap();
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.lower_quartile, 1.0);
        assert_eq!(stats.upper_quartile, 3.0);
    }

    #[test]
    fn three_elements_excludes_median_from_halves() {
        let stats = order_statistics(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.lower_quartile, 1.0);
        assert_eq!(stats.upper_quartile, 3.0);
    }

    #[test]
    fn four_elements_averages_central_pairs() {
        let stats = order_statistics(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.lower_quartile, 1.5);
        assert_eq!(stats.upper_quartile, 3.5);
    }

    #[test]
    fn five_elements() {
        let stats = order_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.lower_quartile, 1.5);
        assert_eq!(stats.upper_quartile, 4.5);
    }

    #[test]
    fn worked_example_even_length() {
        // Sorted form of [3,1,4,1,5,9,2,6]: even length averages the
        // two central elements (standard convention).
        let sorted = [1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0];
        let stats = order_statistics(&sorted).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.lower_quartile, 1.5);
        assert_eq!(stats.upper_quartile, 5.5);
    }

    #[test]
    fn odd_length_takes_middle() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let stats = order_statistics(&sorted).unwrap();
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.lower_quartile, 2.0);
        assert_eq!(stats.upper_quartile, 6.0);
    }
}
