// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Errors surfaced by the ranking engine.
//!
//! Very little in this crate is allowed to fail. "No results" is an answer,
//! popularity races are resolved by timestamp, and estimator edge cases clamp
//! to zero. What remains is bad input at the edges (a malformed document id,
//! an out-of-range config value) and caller-requested cancellation.

use std::path::PathBuf;

/// Everything that can go wrong in `pkgrank`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document id failed validation at ingest time.
    #[error("invalid document id {id:?}: {reason}")]
    InvalidDocumentId { id: String, reason: &'static str },

    /// HyperLogLog precision outside the supported range.
    #[error("precision {0} outside supported range {min}..={max}", min = crate::hll::MIN_PRECISION, max = crate::hll::MAX_PRECISION)]
    InvalidPrecision(u8),

    /// A policy multiplier outside `(0, 1]`.
    #[error("{name} must be in (0, 1], got {value}")]
    InvalidFactor { name: &'static str, value: f64 },

    /// A configuration value that is structurally valid JSON but unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The caller raised the cancel flag while a selection was running.
    #[error("selection cancelled after scanning {scanned} candidates")]
    Cancelled { scanned: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shorthand used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
