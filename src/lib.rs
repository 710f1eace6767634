// SPDX-License-Identifier: AGPL-3.0-or-later
//! streamGauge — GPU descriptive statistics for sensor readings.
//!
//! Computes mean, min, max, variance, standard deviation, median, and
//! quartiles over large one-dimensional arrays of f32 readings using
//! wgpu compute shaders:
//!
//! - Two-level tree reductions (workgroup-local partial reduction in
//!   shared memory, host-side final combine) for sum, min/max, and
//!   squared-deviation sums.
//! - A three-phase bitonic sort pipeline (initial / merge / final) over
//!   a power-of-two padded buffer, from which median and quartiles are
//!   read by index arithmetic.
//!
//! Every GPU result has a sequential CPU counterpart in [`stats::cpu`],
//! cross-checked by the `validate_stats_gpu` binary.

pub mod error;
pub mod gpu;
pub mod io;
pub mod profile;
pub mod stats;
pub mod tolerances;
pub mod validation;
