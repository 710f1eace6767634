// SPDX-License-Identifier: AGPL-3.0-or-later
//! Centralized validation tolerances with numerical justification.
//!
//! Every tolerance threshold used in validation binaries and GPU tests
//! is defined here with documentation of its origin. No ad-hoc magic
//! numbers.
//!
//! # Tolerance categories
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Exact | IEEE 754 total order | min/max, sorted output |
//! | GPU vs CPU | f32 accumulation order | 1e-5 relative for sums |
//! | Derived | error propagation | variance, quartile averaging |

/// Operations that must be exact (extrema, sorted permutations, counts).
///
/// GPU min/max selects one of the input bit patterns; the bitonic sort
/// permutes them. Neither introduces rounding, so equality is exact.
pub const EXACT: f64 = 0.0;

/// Relative tolerance for GPU f32 sum reductions vs CPU f64 baselines.
///
/// f32 has ~7.2 significant digits. The tree reduction and the
/// sequential baseline associate additions differently; for n up to
/// ~10^7 well-scaled readings the relative drift stays well below 1e-5.
pub const SUM_REL: f64 = 1e-5;

/// Relative tolerance for variance / standard deviation.
///
/// Squared deviations amplify the sum drift; one extra decade of
/// headroom over [`SUM_REL`].
pub const VARIANCE_REL: f64 = 1e-4;

/// Absolute tolerance for medians and quartiles.
///
/// Order statistics pick exact elements; only the even-length averaging
/// step rounds, once, in f64. One f32 ULP at instrument scale.
pub const ORDER_STAT_ABS: f64 = 1e-5;
