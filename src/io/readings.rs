// SPDX-License-Identifier: AGPL-3.0-or-later
//! Line-oriented readings parser — zero external parsing dependencies.
//!
//! Streams records from disk via [`BufReader`]. Each line carries
//! whitespace-delimited metadata tokens (station id, timestamp fields)
//! followed by the reading itself; only the **last** token on each line
//! is parsed as an f32 value. Blank lines are skipped.
//!
//! Non-finite values are rejected at load time. This is what lets the
//! sort pipeline use `f32::INFINITY` as its padding sentinel: every
//! accepted reading is finite, so sentinels always order strictly after
//! the real data.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load all readings from a whitespace-delimited text file.
///
/// # Errors
///
/// Returns [`Error::Io`] with path context if the file cannot be read,
/// or [`Error::Readings`] with the 1-based line number for an
/// unparsable or non-finite value.
pub fn load_readings(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut readings = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let Some(token) = line.split_whitespace().last() else {
            continue; // blank line
        };
        let value: f32 = token.parse().map_err(|_| {
            Error::Readings(format!("line {}: cannot parse '{token}' as f32", idx + 1))
        })?;
        if !value.is_finite() {
            return Err(Error::Readings(format!(
                "line {}: non-finite reading {value}",
                idx + 1
            )));
        }
        readings.push(value);
    }
    Ok(readings)
}
