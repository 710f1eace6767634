// SPDX-License-Identifier: AGPL-3.0-or-later
//! wgpu device setup for streamGauge compute pipelines.
//!
//! Creates a wgpu device on the highest-performance adapter and exposes
//! the pieces every pipeline stage needs: the device/queue pair, the
//! largest usable reduction group size, shader compilation with captured
//! diagnostics, and a staging-buffer readback helper.
//!
//! Ordering model: one host control thread issues commands on a single
//! queue; dependent phases are separated by explicit [`GpuContext::wait`]
//! queue-drain points. There is no cancellation or timeout — a hung
//! dispatch blocks the pipeline (acceptable for one offline batch run).

use crate::error::{Error, Result};

/// GPU context shared by the reduction engine and the sort pipeline.
pub struct GpuContext {
    /// GPU adapter name (e.g., "NVIDIA RTX 4070").
    pub adapter_name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
    max_group_size: u32,
    max_workgroups_per_dim: u32,
}

impl GpuContext {
    /// Create a GPU device for f32 compute.
    ///
    /// Respects the `STREAMGAUGE_WGPU_BACKEND` env var (`vulkan`,
    /// `metal`, `dx12`) for backend selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpu`] if no GPU adapter is found or device
    /// creation fails.
    pub async fn new() -> Result<Self> {
        let backends = match std::env::var("STREAMGAUGE_WGPU_BACKEND").as_deref() {
            Ok("vulkan") => wgpu::Backends::VULKAN,
            Ok("metal") => wgpu::Backends::METAL,
            Ok("dx12") => wgpu::Backends::DX12,
            _ => wgpu::Backends::all(),
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("no GPU adapter found".into()))?;

        let info = adapter.get_info();
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("streamGauge compute device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        max_storage_buffer_binding_size: limits
                            .max_storage_buffer_binding_size
                            .min(512 * 1024 * 1024),
                        max_buffer_size: limits.max_buffer_size.min(1024 * 1024 * 1024),
                        ..wgpu::Limits::default()
                    },
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::Gpu(format!("device creation: {e}")))?;

        let device_limits = device.limits();
        let max_group_size = reduction_group_cap(&device_limits);
        let max_workgroups_per_dim = device_limits.max_compute_workgroups_per_dimension;

        Ok(Self {
            adapter_name: info.name,
            device,
            queue,
            max_group_size,
            max_workgroups_per_dim,
        })
    }

    /// Raw wgpu device.
    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Raw wgpu queue.
    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Largest reduction group size this device supports (power of two).
    ///
    /// Bounded by workgroup invocation, x-dimension, and workgroup
    /// shared-memory limits (two f32 scratch arrays for min/max).
    #[must_use]
    pub const fn max_group_size(&self) -> u32 {
        self.max_group_size
    }

    /// Maximum dispatchable workgroups along one dimension.
    #[must_use]
    pub const fn max_workgroups_per_dim(&self) -> u32 {
        self.max_workgroups_per_dim
    }

    /// Block until all submitted work on the queue has completed.
    ///
    /// The explicit queue-drain point between dependent pipeline stages;
    /// cross-stage data hazards are avoided only by these calls.
    pub fn wait(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Compile a WGSL source and create a compute pipeline, capturing
    /// validation diagnostics instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpu`] with the naga build log if the shader or
    /// pipeline fails validation.
    pub async fn create_compute_pipeline(
        &self,
        source: &str,
        entry_point: &str,
        label: &str,
    ) -> Result<wgpu::ComputePipeline> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None,
                module: &module,
                entry_point,
                compilation_options: Default::default(),
                cache: None,
            });

        if let Some(e) = self.device.pop_error_scope().await {
            return Err(Error::Gpu(format!("{label}: shader build failed: {e}")));
        }
        Ok(pipeline)
    }

    /// Read `n` f32 values back from a device buffer.
    ///
    /// Copies into a MAP_READ staging buffer, maps it, and blocks on
    /// queue drain until the mapping resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpu`] if the buffer mapping fails.
    pub fn read_buffer_f32(&self, buf: &wgpu::Buffer, n: usize) -> Result<Vec<f32>> {
        let size = (n * std::mem::size_of::<f32>()) as u64;
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_buffer_to_buffer(buf, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| Error::Gpu("readback channel closed".into()))?
            .map_err(|e| Error::Gpu(format!("buffer mapping: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        Ok(result)
    }

    /// Print adapter capabilities to stdout.
    pub fn print_info(&self) {
        println!("  GPU: {}", self.adapter_name);
        println!("  Max reduction group size: {}", self.max_group_size);
        println!(
            "  Max workgroups per dimension: {}",
            self.max_workgroups_per_dim
        );
    }
}

/// Largest power-of-two workgroup size usable by the reduction kernels.
fn reduction_group_cap(limits: &wgpu::Limits) -> u32 {
    // Two f32 scratch arrays (min + max) must fit in workgroup memory.
    let by_memory = limits.max_compute_workgroup_storage_size / 8;
    let cap = limits
        .max_compute_invocations_per_workgroup
        .min(limits.max_compute_workgroup_size_x)
        .min(by_memory)
        .max(1);
    prev_power_of_two(cap)
}

/// Largest power of two ≤ `n` (n ≥ 1).
pub(crate) fn prev_power_of_two(n: u32) -> u32 {
    debug_assert!(n >= 1);
    let mut p = 1;
    while p * 2 <= n {
        p *= 2;
    }
    p
}
