// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pipeline orchestration: readings in, full summary out.
//!
//! Sequences the GPU stages in dependency order — mean pass first
//! (the variance pass pads with the mean), then min/max, then the
//! squared-deviation pass, then the independent sort pipeline feeding
//! the order-statistics extractor. Fails fast on an empty dataset
//! before touching the device. No retry and no partial-result fallback:
//! any stage error aborts the run.

use crate::error::{Error, Result};
use crate::gpu::{self, GpuContext};
use crate::profile::TimingReport;
use crate::stats::{order, reduce::Reducer, sort::BitonicSorter};

/// Options for one summary run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    /// Reduction group size override. `None` selects the largest
    /// power of two that fits both the device and the dataset.
    /// An explicit value larger than the dataset is a configuration
    /// error, never silently clamped.
    pub group_size: Option<u32>,
    /// Keep the full sorted sequence in the summary.
    pub keep_sorted: bool,
}

/// Descriptive statistics for one reading sequence.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Number of real readings (excludes all padding).
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Minimum reading.
    pub min: f32,
    /// Maximum reading.
    pub max: f32,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation, exactly √variance.
    pub std_dev: f64,
    /// Median (standard convention).
    pub median: f64,
    /// First quartile.
    pub lower_quartile: f64,
    /// Third quartile.
    pub upper_quartile: f64,
    /// Full sorted sequence, when requested.
    pub sorted: Option<Vec<f32>>,
}

/// Compute the full summary for `readings` on the GPU.
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty dataset or invalid group
/// size, [`Error::Gpu`] for device failures.
pub async fn compute_summary(
    ctx: &GpuContext,
    readings: &[f32],
    options: SummaryOptions,
    timings: &mut TimingReport,
) -> Result<Summary> {
    let n = readings.len();
    if n == 0 {
        return Err(Error::Config("empty dataset".into()));
    }

    let group_size = resolve_group_size(ctx, options.group_size, n);
    let reducer = Reducer::new(ctx, group_size, n).await?;

    // Reduction passes, in dependency order.
    let mean = reducer.mean(readings, timings)?;
    let (min, max) = reducer.min_max(readings, timings)?;
    let ssd = reducer.sum_squared_deviations(readings, mean, timings)?;
    let variance = ssd / n as f64;
    let std_dev = variance.sqrt();

    // Independent sort pipeline feeding the order-statistics extractor.
    let sorter = BitonicSorter::new(ctx).await?;
    let sorted = sorter.sort(readings, timings)?;
    let order = order::order_statistics(&sorted)?;

    Ok(Summary {
        n,
        mean,
        min,
        max,
        variance,
        std_dev,
        median: order.median,
        lower_quartile: order.lower_quartile,
        upper_quartile: order.upper_quartile,
        sorted: options.keep_sorted.then_some(sorted),
    })
}

/// Default group size: largest power of two that fits the device and
/// the dataset. Explicit overrides are passed through untouched so the
/// reducer can reject them.
#[allow(clippy::cast_possible_truncation)]
fn resolve_group_size(ctx: &GpuContext, requested: Option<u32>, n: usize) -> u32 {
    requested.unwrap_or_else(|| {
        let cap = ctx.max_group_size().min(n.min(u32::MAX as usize) as u32);
        gpu::prev_power_of_two(cap.max(1))
    })
}
