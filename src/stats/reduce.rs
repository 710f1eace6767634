// SPDX-License-Identifier: AGPL-3.0-or-later
//! Two-level tree reductions: sum, min/max, squared deviations.
//!
//! Local phase on the GPU: each workgroup cooperatively reduces its
//! chunk in shared memory (`workgroupBarrier()` between halving
//! strides) and writes one partial result. Combine phase on the host:
//! a sequential scan over the small partials array, accumulated in f64.
//!
//! Configuration is validated before any device work: the group size
//! must be a nonzero power of two no larger than the sequence length or
//! the device limits, and the group count must fit one dispatch
//! dimension.

use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::profile::{PhaseTiming, TimingReport};
use crate::stats::pad::{self, Neutral};
use bytemuck::{Pod, Zeroable};
use std::time::Instant;
use wgpu::util::DeviceExt;

const SUM_WGSL: &str = include_str!("../shaders/sum_reduce.wgsl");
const MINMAX_WGSL: &str = include_str!("../shaders/minmax_reduce.wgsl");
const VARIANCE_WGSL: &str = include_str!("../shaders/variance_reduce.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ReduceParams {
    mean: f32,
    count: u32,
    _pad0: u32,
    _pad1: u32,
}

/// GPU reduction engine for one dataset length and group size.
pub struct Reducer<'a> {
    ctx: &'a GpuContext,
    group_size: u32,
    sum_pipeline: wgpu::ComputePipeline,
    minmax_pipeline: wgpu::ComputePipeline,
    variance_pipeline: wgpu::ComputePipeline,
}

impl<'a> Reducer<'a> {
    /// Compile the three reduction pipelines for `group_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid group size (zero, not a
    /// power of two, larger than `data_len` or the device limits, or a
    /// group count exceeding one dispatch dimension), or [`Error::Gpu`]
    /// if shader compilation fails.
    pub async fn new(ctx: &'a GpuContext, group_size: u32, data_len: usize) -> Result<Self> {
        validate_group_size(ctx, group_size, data_len)?;

        let sum_pipeline = ctx
            .create_compute_pipeline(&patch(SUM_WGSL, group_size), "main", "sum_reduce")
            .await?;
        let minmax_pipeline = ctx
            .create_compute_pipeline(&patch(MINMAX_WGSL, group_size), "main", "minmax_reduce")
            .await?;
        let variance_pipeline = ctx
            .create_compute_pipeline(&patch(VARIANCE_WGSL, group_size), "main", "variance_reduce")
            .await?;

        Ok(Self {
            ctx,
            group_size,
            sum_pipeline,
            minmax_pipeline,
            variance_pipeline,
        })
    }

    /// The validated group size in use.
    #[must_use]
    pub const fn group_size(&self) -> u32 {
        self.group_size
    }

    /// Sum of all readings, combined on the host in f64.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty dataset or [`Error::Gpu`]
    /// on readback failure.
    pub fn sum(&self, data: &[f32], timings: &mut TimingReport) -> Result<f64> {
        let padded = pad::pad_to_group_multiple(data, self.group_size, Neutral::Sum);
        let partials = self.run(
            &self.sum_pipeline,
            &padded,
            data.len(),
            0.0,
            false,
            "sum reduce",
            timings,
        )?;
        Ok(partials.iter().copied().map(f64::from).sum())
    }

    /// Arithmetic mean: sum divided by the **real** length, never the
    /// padded length.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Reducer::sum`].
    pub fn mean(&self, data: &[f32], timings: &mut TimingReport) -> Result<f64> {
        Ok(self.sum(data, timings)? / data.len() as f64)
    }

    /// Elementwise minimum and maximum in one pass.
    ///
    /// The buffer is padded with the min identity (+∞); the kernel
    /// additionally neutralizes pad lanes for the max side using the
    /// real element count, so neither extremum can come from padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty dataset or [`Error::Gpu`]
    /// on readback failure.
    #[allow(clippy::cast_possible_truncation)]
    pub fn min_max(&self, data: &[f32], timings: &mut TimingReport) -> Result<(f32, f32)> {
        let padded = pad::pad_to_group_multiple(data, self.group_size, Neutral::Min);
        let groups = (padded.len() / self.group_size as usize) as u32;
        if groups == 0 {
            return Err(Error::Config("min/max reduction produced zero groups".into()));
        }

        let d = self.ctx.device();
        let t_upload = Instant::now();
        let params = ReduceParams {
            mean: 0.0,
            count: data.len() as u32,
            _pad0: 0,
            _pad1: 0,
        };
        let params_buf = d.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("minmax params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let input_buf = d.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("minmax input"),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let mins_buf = partials_buffer(d, groups, "partial mins");
        let maxs_buf = partials_buffer(d, groups, "partial maxs");
        let upload = t_upload.elapsed();

        let t_exec = Instant::now();
        self.dispatch(
            &self.minmax_pipeline,
            &[
                binding(0, &params_buf),
                binding(1, &input_buf),
                binding(2, &mins_buf),
                binding(3, &maxs_buf),
            ],
            groups,
            "min/max reduce",
        );
        let execute = t_exec.elapsed();

        let t_download = Instant::now();
        let mins = self.ctx.read_buffer_f32(&mins_buf, groups as usize)?;
        let maxs = self.ctx.read_buffer_f32(&maxs_buf, groups as usize)?;
        let download = t_download.elapsed();
        timings.record(
            "min/max reduce",
            PhaseTiming {
                upload,
                execute,
                download,
            },
        );

        let min = mins.iter().copied().fold(f32::INFINITY, f32::min);
        let max = maxs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Ok((min, max))
    }

    /// Sum of squared deviations Σ(x − mean)², combined on the host in
    /// f64. Strict dependency: `mean` must come from the completed mean
    /// pass — the buffer is padded with it so pad lanes contribute zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty dataset or [`Error::Gpu`]
    /// on readback failure.
    #[allow(clippy::cast_possible_truncation)]
    pub fn sum_squared_deviations(
        &self,
        data: &[f32],
        mean: f64,
        timings: &mut TimingReport,
    ) -> Result<f64> {
        let mean = mean as f32;
        let padded = pad::pad_to_group_multiple(data, self.group_size, Neutral::Deviation(mean));
        let partials = self.run(
            &self.variance_pipeline,
            &padded,
            data.len(),
            mean,
            true,
            "variance reduce",
            timings,
        )?;
        Ok(partials.iter().copied().map(f64::from).sum())
    }

    // ── Internal dispatch plumbing ───────────────────────────────

    /// Upload, dispatch, and read back one single-output reduction.
    #[allow(clippy::cast_possible_truncation, clippy::too_many_arguments)]
    fn run(
        &self,
        pipeline: &wgpu::ComputePipeline,
        padded: &[f32],
        real_len: usize,
        mean: f32,
        with_params: bool,
        label: &'static str,
        timings: &mut TimingReport,
    ) -> Result<Vec<f32>> {
        if real_len == 0 {
            return Err(Error::Config("cannot reduce an empty dataset".into()));
        }
        let groups = (padded.len() / self.group_size as usize) as u32;
        if groups == 0 {
            return Err(Error::Config(format!(
                "{label}: group size {} exceeds padded length {}",
                self.group_size,
                padded.len()
            )));
        }

        let d = self.ctx.device();
        let t_upload = Instant::now();
        let params = ReduceParams {
            mean,
            count: real_len as u32,
            _pad0: 0,
            _pad1: 0,
        };
        let params_buf = d.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let input_buf = d.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(padded),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let partials_buf = partials_buffer(d, groups, label);
        let upload = t_upload.elapsed();

        let entries_with_params = [
            binding(0, &params_buf),
            binding(1, &input_buf),
            binding(2, &partials_buf),
        ];
        let entries_plain = [binding(0, &input_buf), binding(1, &partials_buf)];

        let t_exec = Instant::now();
        self.dispatch(
            pipeline,
            if with_params {
                &entries_with_params
            } else {
                &entries_plain
            },
            groups,
            label,
        );
        let execute = t_exec.elapsed();

        let t_download = Instant::now();
        let partials = self.ctx.read_buffer_f32(&partials_buf, groups as usize)?;
        let download = t_download.elapsed();
        timings.record(
            label,
            PhaseTiming {
                upload,
                execute,
                download,
            },
        );

        if partials.is_empty() {
            return Err(Error::Config(format!("{label}: empty partials array")));
        }
        Ok(partials)
    }

    /// Encode one compute pass and block until the queue drains.
    fn dispatch(
        &self,
        pipeline: &wgpu::ComputePipeline,
        entries: &[wgpu::BindGroupEntry],
        groups: u32,
        label: &str,
    ) {
        let d = self.ctx.device();
        let bind_group = d.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.get_bind_group_layout(0),
            entries,
        });
        let mut encoder = d.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups, 1, 1);
        }
        self.ctx.queue().submit(std::iter::once(encoder.finish()));
        self.ctx.wait();
    }
}

fn partials_buffer(device: &wgpu::Device, groups: u32, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: u64::from(groups) * std::mem::size_of::<f32>() as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    })
}

fn binding(index: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding: index,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer,
            offset: 0,
            size: None,
        }),
    }
}

fn patch(source: &str, group_size: u32) -> String {
    source.replace("{{GROUP_SIZE}}", &group_size.to_string())
}

/// Reject invalid reduction configurations before any device work.
fn validate_group_size(ctx: &GpuContext, group_size: u32, data_len: usize) -> Result<()> {
    if group_size == 0 {
        return Err(Error::Config("group size must be nonzero".into()));
    }
    if !group_size.is_power_of_two() {
        return Err(Error::Config(format!(
            "group size {group_size} must be a power of two (tree reduction halves strides)"
        )));
    }
    if data_len == 0 {
        return Err(Error::Config("cannot reduce an empty dataset".into()));
    }
    if group_size as usize > data_len {
        return Err(Error::Config(format!(
            "group size {group_size} exceeds sequence length {data_len}"
        )));
    }
    if group_size > ctx.max_group_size() {
        return Err(Error::Config(format!(
            "group size {group_size} exceeds device limit {}",
            ctx.max_group_size()
        )));
    }
    let groups = data_len.div_ceil(group_size as usize);
    if groups > ctx.max_workgroups_per_dim() as usize {
        return Err(Error::Config(format!(
            "{groups} workgroups exceed the device dispatch limit {}",
            ctx.max_workgroups_per_dim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::patch;

    #[test]
    fn patch_substitutes_group_size() {
        let patched = patch("@compute @workgroup_size({{GROUP_SIZE}}) var x: array<f32, {{GROUP_SIZE}}>;", 128);
        assert!(patched.contains("@workgroup_size(128)"));
        assert!(patched.contains("array<f32, 128>"));
        assert!(!patched.contains("{{GROUP_SIZE}}"));
    }
}
