// SPDX-License-Identifier: AGPL-3.0-or-later
//! GPU validation — compare every GPU statistic against CPU baselines.
//!
//! Follows the harness contract: GPU result vs CPU result → check →
//! exit 0 (pass) / 1 (fail) / 2 (skip, no GPU adapter).
//!
//! Covered:
//! - Worked example `[3,1,4,1,5,9,2,6]` with known statistics
//! - Non-power-of-two length (sort padding + truncation)
//! - All-negative data (the min/max padding trap)
//! - Large synthetic dataset, default and explicit group sizes
//! - Sort idempotence on already-sorted input
//! - Oversized group size rejected as a configuration error
//!
//! Run: `cargo run --release --bin validate_stats_gpu`

use streamgauge::error::Error;
use streamgauge::gpu::GpuContext;
use streamgauge::profile::TimingReport;
use streamgauge::stats::{cpu, reduce::Reducer, sort::BitonicSorter, summary};
use streamgauge::tolerances;
use streamgauge::validation::{self, Validator};

#[tokio::main]
async fn main() {
    let mut v = Validator::new("streamGauge GPU Statistics Validation");

    let ctx = match GpuContext::new().await {
        Ok(c) => c,
        Err(e) => validation::exit_skipped(&format!("GPU init failed: {e}")),
    };
    ctx.print_info();
    println!();

    validate_worked_example(&ctx, &mut v).await;
    validate_non_pow2_sort(&ctx, &mut v).await;
    validate_all_negative(&ctx, &mut v).await;
    validate_large_synthetic(&ctx, &mut v).await;
    validate_sort_idempotence(&ctx, &mut v).await;
    validate_group_size_rejection(&ctx, &mut v).await;

    v.finish();
}

/// Deterministic synthetic readings in a temperature-like range.
fn synthetic_readings(n: usize) -> Vec<f32> {
    let mut state: u64 = 0x5eed_1234_abcd_0001;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // Map the top 24 bits to [-40, 50).
            let unit = (state >> 40) as f32 / (1u32 << 24) as f32;
            -40.0 + unit * 90.0
        })
        .collect()
}

async fn validate_worked_example(ctx: &GpuContext, v: &mut Validator) {
    v.section("── Worked example (N=8, power of two) ──");
    let data = [3.0f32, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
    let mut timings = TimingReport::new();
    let options = summary::SummaryOptions {
        group_size: Some(4),
        keep_sorted: true,
    };
    match summary::compute_summary(ctx, &data, options, &mut timings).await {
        Ok(s) => {
            v.check("mean", s.mean, 3.875, tolerances::SUM_REL);
            v.check("min", f64::from(s.min), 1.0, tolerances::EXACT);
            v.check("max", f64::from(s.max), 9.0, tolerances::EXACT);
            v.check("median", s.median, 3.5, tolerances::EXACT);
            v.check("Q1", s.lower_quartile, 1.5, tolerances::EXACT);
            v.check("Q3", s.upper_quartile, 5.5, tolerances::EXACT);
            v.check("std_dev == sqrt(variance)", s.std_dev, s.variance.sqrt(), 0.0);
            let sorted = s.sorted.expect("keep_sorted requested");
            let expected = [1.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0];
            let mismatches = sorted
                .iter()
                .zip(expected.iter())
                .filter(|(a, b)| a != b)
                .count();
            v.check_count("sorted sequence mismatches", mismatches, 0);
        }
        Err(e) => {
            println!("  [FAIL]  worked example: {e}");
            v.check_count("worked example completed", 0, 1);
        }
    }
}

async fn validate_non_pow2_sort(ctx: &GpuContext, v: &mut Validator) {
    v.section("── Non-power-of-two sort (N=5 padded to 8) ──");
    let data = [3.0f32, 1.0, 4.0, 1.0, 5.0];
    let sorter = match BitonicSorter::new(ctx).await {
        Ok(s) => s,
        Err(e) => {
            println!("  [FAIL]  sorter init: {e}");
            v.check_count("sorter init", 0, 1);
            return;
        }
    };
    let mut timings = TimingReport::new();
    match sorter.sort(&data, &mut timings) {
        Ok(sorted) => {
            v.check_count("sorted length equals N", sorted.len(), 5);
            let expected = cpu::sorted(&data);
            let mismatches = sorted
                .iter()
                .zip(expected.iter())
                .filter(|(a, b)| a != b)
                .count();
            v.check_count("truncation recovers 5 smallest in order", mismatches, 0);
        }
        Err(e) => {
            println!("  [FAIL]  sort: {e}");
            v.check_count("non-pow2 sort completed", 0, 1);
        }
    }
}

async fn validate_all_negative(ctx: &GpuContext, v: &mut Validator) {
    v.section("── All-negative data (min/max padding trap) ──");
    let data: Vec<f32> = (1..=1000).map(|i| -(i as f32) / 10.0).collect();
    let reducer = match Reducer::new(ctx, 64, data.len()).await {
        Ok(r) => r,
        Err(e) => {
            println!("  [FAIL]  reducer init: {e}");
            v.check_count("reducer init", 0, 1);
            return;
        }
    };
    let mut timings = TimingReport::new();
    match reducer.min_max(&data, &mut timings) {
        Ok((min, max)) => {
            let (cmin, cmax) = cpu::min_max(&data).unwrap();
            v.check("min (all negative)", f64::from(min), f64::from(cmin), tolerances::EXACT);
            v.check("max (all negative)", f64::from(max), f64::from(cmax), tolerances::EXACT);
        }
        Err(e) => {
            println!("  [FAIL]  min/max: {e}");
            v.check_count("all-negative min/max completed", 0, 1);
        }
    }
}

async fn validate_large_synthetic(ctx: &GpuContext, v: &mut Validator) {
    v.section("── Large synthetic dataset (N=100003, odd, non-pow2) ──");
    let data = synthetic_readings(100_003);
    let cpu_mean = cpu::mean(&data).unwrap();
    let (cpu_min, cpu_max) = cpu::min_max(&data).unwrap();
    let cpu_var = cpu::variance(&data, cpu_mean);
    let cpu_sorted = cpu::sorted(&data);

    for group_size in [None, Some(64)] {
        let label = group_size.map_or("default group".to_string(), |g| format!("group {g}"));
        let mut timings = TimingReport::new();
        let options = summary::SummaryOptions {
            group_size,
            keep_sorted: true,
        };
        match summary::compute_summary(ctx, &data, options, &mut timings).await {
            Ok(s) => {
                v.check_relative(&format!("mean ({label})"), s.mean, cpu_mean, tolerances::SUM_REL);
                v.check(&format!("min ({label})"), f64::from(s.min), f64::from(cpu_min), tolerances::EXACT);
                v.check(&format!("max ({label})"), f64::from(s.max), f64::from(cpu_max), tolerances::EXACT);
                v.check_relative(&format!("variance ({label})"), s.variance, cpu_var, tolerances::VARIANCE_REL);
                v.check(&format!("std_dev consistency ({label})"), s.std_dev, s.variance.sqrt(), 0.0);
                let sorted = s.sorted.expect("keep_sorted requested");
                let mismatches = sorted
                    .iter()
                    .zip(cpu_sorted.iter())
                    .filter(|(a, b)| a != b)
                    .count();
                v.check_count(&format!("sorted mismatches ({label})"), mismatches, 0);
                let cpu_order =
                    streamgauge::stats::order::order_statistics(&cpu_sorted).unwrap();
                v.check(&format!("median ({label})"), s.median, cpu_order.median, tolerances::ORDER_STAT_ABS);
                v.check(&format!("Q1 ({label})"), s.lower_quartile, cpu_order.lower_quartile, tolerances::ORDER_STAT_ABS);
                v.check(&format!("Q3 ({label})"), s.upper_quartile, cpu_order.upper_quartile, tolerances::ORDER_STAT_ABS);
            }
            Err(e) => {
                println!("  [FAIL]  summary ({label}): {e}");
                v.check_count(&format!("summary completed ({label})"), 0, 1);
            }
        }
    }
}

async fn validate_sort_idempotence(ctx: &GpuContext, v: &mut Validator) {
    v.section("── Sort idempotence ──");
    let data = synthetic_readings(4096);
    let sorter = match BitonicSorter::new(ctx).await {
        Ok(s) => s,
        Err(e) => {
            println!("  [FAIL]  sorter init: {e}");
            v.check_count("sorter init", 0, 1);
            return;
        }
    };
    let mut timings = TimingReport::new();
    let once = sorter.sort(&data, &mut timings).unwrap_or_default();
    let twice = sorter.sort(&once, &mut timings).unwrap_or_default();
    let mismatches = once.iter().zip(twice.iter()).filter(|(a, b)| a != b).count();
    v.check_count("sorting a sorted sequence changes nothing", mismatches, 0);
    v.check_count("idempotent sort length", twice.len(), data.len());
}

async fn validate_group_size_rejection(ctx: &GpuContext, v: &mut Validator) {
    v.section("── Configuration error handling ──");
    let data = [1.0f32; 16];
    let oversized = Reducer::new(ctx, 64, data.len()).await;
    v.check_count(
        "group size larger than N rejected as Config",
        usize::from(matches!(oversized, Err(Error::Config(_)))),
        1,
    );
    let not_pow2 = Reducer::new(ctx, 12, 1024).await;
    v.check_count(
        "non-power-of-two group size rejected as Config",
        usize::from(matches!(not_pow2, Err(Error::Config(_)))),
        1,
    );
    let zero = Reducer::new(ctx, 0, 1024).await;
    v.check_count(
        "zero group size rejected as Config",
        usize::from(matches!(zero, Err(Error::Config(_)))),
        1,
    );
}
