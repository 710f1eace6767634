// SPDX-License-Identifier: AGPL-3.0-or-later
//! Three-phase bitonic sort pipeline on the GPU.
//!
//! The padded buffer (power-of-two length L, `f32::INFINITY` sentinels)
//! moves through an explicit phase state machine:
//!
//! - [`Phase::Initial`] — one pass builds independent bitonic
//!   4-sequences (adjacent pairs, direction alternating per 4-block).
//! - [`Phase::Merge`] — stage k merges bitonic sequences of span
//!   `4 << k` into sorted blocks with alternating direction, preserving
//!   the bitonic invariant for stage k+1. One dispatch per
//!   compare-exchange distance.
//! - [`Phase::Final`] — merges the single full-length bitonic sequence
//!   ascending.
//!
//! The host blocks on queue drain after **every** dispatch: a pass may
//! only read elements the previous pass has finalized, and there is no
//! valid reordering or overlap between passes. Any dispatch failure
//! aborts the whole sort — a partially sorted buffer is not a
//! recoverable state.
//!
//! After every phase the buffer is a union of bitonic subsequences
//! whose count halves and whose length doubles per merge stage; after
//! the final phase exactly one ascending sequence remains. Equal values
//! keep no particular relative order (not stable, not required).

use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::profile::{PhaseTiming, TimingReport};
use crate::stats::pad;
use bytemuck::{Pod, Zeroable};
use std::time::Instant;
use wgpu::util::DeviceExt;

const BITONIC_WGSL: &str = include_str!("../shaders/bitonic.wgsl");

/// Threads per workgroup for the compare-exchange kernels. Independent
/// of the reduction group size: the network indexes globally, so the
/// workgroup shape only affects occupancy.
const SORT_WORKGROUP: u32 = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct StageParams {
    span: u32,
    dist: u32,
    len: u32,
    _pad: u32,
}

/// Pipeline phase for one dispatch of the sort state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    Merge { stage: u32 },
    Final,
}

/// GPU bitonic sorter; compiles the three phase pipelines once.
pub struct BitonicSorter<'a> {
    ctx: &'a GpuContext,
    initial: wgpu::ComputePipeline,
    stage: wgpu::ComputePipeline,
    final_merge: wgpu::ComputePipeline,
}

impl<'a> BitonicSorter<'a> {
    /// Compile the bitonic phase pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Gpu`] if shader compilation fails.
    pub async fn new(ctx: &'a GpuContext) -> Result<Self> {
        let initial = ctx
            .create_compute_pipeline(BITONIC_WGSL, "bitonic_initial", "bitonic_initial")
            .await?;
        let stage = ctx
            .create_compute_pipeline(BITONIC_WGSL, "bitonic_stage", "bitonic_stage")
            .await?;
        let final_merge = ctx
            .create_compute_pipeline(BITONIC_WGSL, "bitonic_final", "bitonic_final")
            .await?;
        Ok(Self {
            ctx,
            initial,
            stage,
            final_merge,
        })
    }

    /// Sort `data` ascending on the GPU and return the depadded result.
    ///
    /// Pads to the next power of two with `f32::INFINITY`, runs the
    /// phase state machine, reads the buffer back, and truncates to the
    /// real length (sentinels drop off the end).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the padded length needs more
    /// workgroups than the device can dispatch along one dimension, or
    /// [`Error::Gpu`] if readback fails.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sort(&self, data: &[f32], timings: &mut TimingReport) -> Result<Vec<f32>> {
        let n = data.len();
        if n <= 1 {
            return Ok(data.to_vec());
        }

        let padded = pad::pad_to_pow2(data);
        let len = padded.len() as u32;
        validate_dispatch(len, self.ctx.max_workgroups_per_dim())?;

        let t_upload = Instant::now();
        let data_buf = self
            .ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bitonic sort data"),
                contents: bytemuck::cast_slice(&padded),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            });
        let upload = t_upload.elapsed();

        let t_exec = Instant::now();
        for phase in plan(len) {
            self.run_phase(phase, len, &data_buf);
        }
        let execute = t_exec.elapsed();

        let t_download = Instant::now();
        let mut sorted = self.ctx.read_buffer_f32(&data_buf, len as usize)?;
        let download = t_download.elapsed();
        timings.record(
            "bitonic sort",
            PhaseTiming {
                upload,
                execute,
                download,
            },
        );

        sorted.truncate(n);
        Ok(sorted)
    }

    /// Dispatch every compare-exchange pass of one phase, draining the
    /// queue after each pass.
    fn run_phase(&self, phase: Phase, len: u32, data_buf: &wgpu::Buffer) {
        match phase {
            Phase::Initial => {
                self.dispatch(&self.initial, StageParams { span: 2, dist: 1, len, _pad: 0 }, data_buf);
            }
            Phase::Merge { stage } => {
                let span = 4u32 << stage;
                let mut dist = span >> 1;
                while dist >= 1 {
                    self.dispatch(&self.stage, StageParams { span, dist, len, _pad: 0 }, data_buf);
                    dist >>= 1;
                }
            }
            Phase::Final => {
                let mut dist = len >> 1;
                while dist >= 1 {
                    self.dispatch(&self.final_merge, StageParams { span: len, dist, len, _pad: 0 }, data_buf);
                    dist >>= 1;
                }
            }
        }
    }

    /// One compare-exchange pass followed by an explicit queue drain.
    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, params: StageParams, data_buf: &wgpu::Buffer) {
        let d = self.ctx.device();
        let params_buf = d.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bitonic stage params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = d.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bitonic stage"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: data_buf.as_entire_binding(),
                },
            ],
        });
        let mut encoder = d.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("bitonic stage"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(params.len.div_ceil(SORT_WORKGROUP), 1, 1);
        }
        self.ctx.queue().submit(std::iter::once(encoder.finish()));
        self.ctx.wait();
    }
}

/// Reject padded lengths whose compare-exchange passes would need more
/// workgroups than one dispatch dimension allows. Checked before any
/// device work so the failure is a catchable error, not an uncaptured
/// validation fault mid-pipeline.
fn validate_dispatch(len: u32, max_workgroups: u32) -> Result<()> {
    let groups = len.div_ceil(SORT_WORKGROUP);
    if groups > max_workgroups {
        return Err(Error::Config(format!(
            "sorting {len} padded elements needs {groups} workgroups, \
             exceeding the device dispatch limit {max_workgroups}"
        )));
    }
    Ok(())
}

/// The phase sequence for a padded length `len` (power of two ≥ 2).
///
/// Initial always runs; merge stages cover spans 4 .. len/2; the final
/// phase runs whenever more than one bitonic 4-block exists. For
/// len == 2 the initial pass alone sorts the pair ascending.
fn plan(len: u32) -> Vec<Phase> {
    debug_assert!(len.is_power_of_two() && len >= 2);
    let stages = len.trailing_zeros();
    let mut phases = vec![Phase::Initial];
    for stage in 0..stages.saturating_sub(2) {
        phases.push(Phase::Merge { stage });
    }
    if len >= 4 {
        phases.push(Phase::Final);
    }
    phases
}

#[cfg(test)]
mod tests {
    use super::{plan, validate_dispatch, Phase, SORT_WORKGROUP};
    use crate::error::Error;

    #[test]
    fn plan_for_pair_is_initial_only() {
        assert_eq!(plan(2), vec![Phase::Initial]);
    }

    #[test]
    fn plan_for_four_skips_merge() {
        assert_eq!(plan(4), vec![Phase::Initial, Phase::Final]);
    }

    #[test]
    fn plan_for_sixteen() {
        assert_eq!(
            plan(16),
            vec![
                Phase::Initial,
                Phase::Merge { stage: 0 },
                Phase::Merge { stage: 1 },
                Phase::Final,
            ]
        );
    }

    #[test]
    fn merge_stage_count_grows_with_log_len() {
        // log2(1024) = 10 -> stages 0..8 merge, plus initial and final.
        assert_eq!(plan(1024).len(), 10);
    }

    #[test]
    fn dispatch_within_device_limit_accepted() {
        // 2^23 padded elements / 256 threads = 32768 workgroups.
        assert!(validate_dispatch(1 << 23, 65_535).is_ok());
        // Exactly at the limit.
        assert!(validate_dispatch(65_535 * SORT_WORKGROUP, 65_535).is_ok());
    }

    #[test]
    fn dispatch_beyond_device_limit_is_config_error() {
        // 2^25 padded elements / 256 threads = 131072 workgroups, far
        // past the common 65535 per-dimension limit.
        let err = validate_dispatch(1 << 25, 65_535).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
        // One workgroup past the limit is already rejected.
        assert!(validate_dispatch(65_536 * SORT_WORKGROUP, 65_535).is_err());
    }
}
