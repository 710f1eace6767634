// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for streamGauge I/O and computation.
//!
//! All parser, configuration, and GPU errors use [`Error`], with one
//! variant per failure class. No external error crates — zero-dependency
//! error type.
//!
//! The taxonomy mirrors where a failure can abort the pipeline:
//! configuration errors fail fast before any device work, shader
//! compilation errors are fatal with diagnostics, and runtime device
//! errors propagate up as a single fatal error (no retry, no partial
//! results — the target use case is one offline batch run).

use std::fmt;
use std::path::PathBuf;

/// Errors produced by streamGauge parsers and compute pipelines.
#[derive(Debug)]
pub enum Error {
    /// File I/O error with path context.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Readings-file parsing error (bad token, non-finite value).
    Readings(String),
    /// Invalid configuration (group size, empty dataset, dispatch limits).
    Config(String),
    /// GPU error (adapter/device creation, shader compilation, dispatch).
    Gpu(String),
}

/// Result type alias for streamGauge operations.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Readings(msg) => write!(f, "readings parse error: {msg}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Gpu(msg) => write!(f, "GPU compute error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Readings(_) | Self::Config(_) | Self::Gpu(_) => None,
        }
    }
}
