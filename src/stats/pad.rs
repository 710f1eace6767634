// SPDX-License-Identifier: AGPL-3.0-or-later
//! Buffer preparation: padding with algebraically neutral elements.
//!
//! Reductions need buffer lengths divisible by the workgroup size; the
//! bitonic sort needs a power-of-two length. Padding must never change
//! the numeric result, so the pad value is the reduction's algebraic
//! identity — an explicit parameter, never a hardcoded literal. Zero is
//! only the identity for addition: padding a min reduction with 0 would
//! silently corrupt the result for all-positive data (and a max
//! reduction for all-negative data), which is why [`Neutral::Min`] and
//! [`Neutral::Max`] use the comparison identities instead.

/// Sentinel appended by [`pad_to_pow2`]; sorts after every finite
/// reading, so truncating the sorted output to the real length drops
/// exactly the padding.
pub const SORT_SENTINEL: f32 = f32::INFINITY;

/// The algebraic identity of a reduction operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neutral {
    /// Additive identity (sum / mean pass).
    Sum,
    /// Identity for min tracking: +∞ can never be selected by `min`.
    Min,
    /// Identity for max tracking: −∞ can never be selected by `max`.
    Max,
    /// Identity for the squared-deviation pass: the mean itself, so a
    /// pad element contributes (mean − mean)² = 0. Requires the mean
    /// pass to have completed first.
    Deviation(f32),
}

impl Neutral {
    /// The pad value for this operation.
    #[must_use]
    pub fn value(self) -> f32 {
        match self {
            Self::Sum => 0.0,
            Self::Min => f32::INFINITY,
            Self::Max => f32::NEG_INFINITY,
            Self::Deviation(mean) => mean,
        }
    }
}

/// Extend `data` to the smallest multiple of `group_size` ≥ its length,
/// appending the operation's neutral element.
///
/// Already-divisible input is returned unchanged (no spurious extra
/// group of padding).
#[must_use]
pub fn pad_to_group_multiple(data: &[f32], group_size: u32, neutral: Neutral) -> Vec<f32> {
    let group = group_size as usize;
    debug_assert!(group > 0);
    let target = data.len().div_ceil(group) * group;
    let mut padded = data.to_vec();
    padded.resize(target, neutral.value());
    padded
}

/// Extend `data` to the next power of two ≥ its length, appending
/// [`SORT_SENTINEL`].
#[must_use]
pub fn pad_to_pow2(data: &[f32]) -> Vec<f32> {
    let target = data.len().next_power_of_two();
    let mut padded = data.to_vec();
    padded.resize(target, SORT_SENTINEL);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_values() {
        assert_eq!(Neutral::Sum.value(), 0.0);
        assert_eq!(Neutral::Min.value(), f32::INFINITY);
        assert_eq!(Neutral::Max.value(), f32::NEG_INFINITY);
        assert_eq!(Neutral::Deviation(3.5).value(), 3.5);
    }

    #[test]
    fn pad_to_group_multiple_rounds_up() {
        let padded = pad_to_group_multiple(&[1.0, 2.0, 3.0], 4, Neutral::Sum);
        assert_eq!(padded, vec![1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn divisible_length_is_unchanged() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let padded = pad_to_group_multiple(&data, 4, Neutral::Sum);
        assert_eq!(padded, data.to_vec());
    }

    #[test]
    fn min_padding_cannot_win_for_positive_data() {
        let padded = pad_to_group_multiple(&[5.0, 7.0, 3.0], 8, Neutral::Min);
        let min = padded.iter().copied().fold(f32::INFINITY, f32::min);
        assert_eq!(min, 3.0);
    }

    #[test]
    fn max_padding_cannot_win_for_negative_data() {
        let padded = pad_to_group_multiple(&[-5.0, -7.0, -3.0], 8, Neutral::Max);
        let max = padded.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max, -3.0);
    }

    #[test]
    fn deviation_padding_contributes_zero() {
        let mean = 4.0;
        let padded = pad_to_group_multiple(&[1.0, 7.0], 4, Neutral::Deviation(mean));
        let ssd: f32 = padded.iter().map(|x| (x - mean) * (x - mean)).sum();
        assert_eq!(ssd, 9.0 + 9.0);
    }

    #[test]
    fn pow2_padding_uses_sentinel() {
        let padded = pad_to_pow2(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(padded.len(), 8);
        assert_eq!(&padded[..5], &[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert!(padded[5..].iter().all(|&x| x == SORT_SENTINEL));
    }

    #[test]
    fn pow2_length_is_unchanged() {
        let data = [2.0, 1.0, 4.0, 3.0];
        assert_eq!(pad_to_pow2(&data), data.to_vec());
    }

    #[test]
    fn single_element_pow2() {
        assert_eq!(pad_to_pow2(&[9.0]), vec![9.0]);
    }
}
