// SPDX-License-Identifier: AGPL-3.0-or-later
//! I/O parsers for sensor-reading datasets.

pub mod readings;
