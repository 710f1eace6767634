// SPDX-License-Identifier: AGPL-3.0-or-later
//! Descriptive statistics over f32 reading sequences.
//!
//! GPU path: [`pad`] prepares buffers with per-operation neutral
//! elements, [`reduce`] runs two-level tree reductions, [`sort`] runs
//! the three-phase bitonic pipeline, and [`order`] extracts median and
//! quartiles from the sorted result. [`summary`] sequences all of it;
//! [`cpu`] holds the sequential baselines used for validation.

pub mod cpu;
pub mod order;
pub mod pad;
pub mod reduce;
pub mod sort;
pub mod summary;
