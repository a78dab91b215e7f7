// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The math behind search ranking.
//!
//! ```text
//! score = rank × ln(e + popularity) × redist × manifest × matched
//! ```
//!
//! | Factor     | Range          | Source                                     |
//! |------------|----------------|--------------------------------------------|
//! | `rank`     | `[0, 1]`       | relevance collaborator (clamped here)      |
//! | `ln(e+p)`  | `[1, ∞)`       | document popularity                        |
//! | `redist`   | `(0, 1]`       | 1, or the configured penalty               |
//! | `manifest` | `(0, 1]`       | 1, or the configured penalty               |
//! | `matched`  | `{0, 1}`       | relevance collaborator's membership test   |
//!
//! # Key Invariant: popularity bounds the score
//!
//! Every factor except `ln(e + popularity)` is at most 1, so
//! `score(doc) ≤ doc.ln_popularity()` for every query. The top-K selector's
//! early termination is only sound while this holds, which is why the rank is
//! clamped instead of trusted, and why the policy factors reject values above 1.

use crate::error::{Error, Result};
use crate::relevance::RelevanceMatch;
use crate::types::SearchDocument;

// =============================================================================
// SCORING CONSTANTS
// =============================================================================

/// Scores at or below this are treated as noise and dropped from results.
pub const NOISE_FLOOR: f64 = 0.1;

/// Neutral policy multiplier: no penalty.
pub const NO_PENALTY: f64 = 1.0;

/// `ln(e + count)`.
///
/// The `e` offset makes an unreferenced package score `ln(e) = 1` rather than
/// `ln(0) = -∞`, and keeps the function strictly increasing in `count`.
#[inline]
pub fn ln_popularity(count: u64) -> f64 {
    (std::f64::consts::E + count as f64).ln()
}

/// Score multipliers for documents that fail a policy check.
///
/// Each factor discounts but never zeroes a score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyFactors {
    redistributable: f64,
    manifest: f64,
}

impl PolicyFactors {
    /// Validate both factors are in `(0, 1]`.
    pub fn new(redistributable: f64, manifest: f64) -> Result<Self> {
        Ok(Self {
            redistributable: check_factor("redistributable factor", redistributable)?,
            manifest: check_factor("manifest factor", manifest)?,
        })
    }

    /// Multiplier applied to non-redistributable packages.
    pub fn redistributable(&self) -> f64 {
        self.redistributable
    }

    /// Multiplier applied to packages without a dependency manifest.
    pub fn manifest(&self) -> f64 {
        self.manifest
    }
}

impl Default for PolicyFactors {
    fn default() -> Self {
        Self {
            redistributable: NO_PENALTY,
            manifest: NO_PENALTY,
        }
    }
}

fn check_factor(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(Error::InvalidFactor { name, value })
    }
}

/// Relevance rank forced into `[0, 1]`; NaN counts as no relevance.
#[inline]
pub fn clamp_rank(rank: f64) -> f64 {
    if rank.is_nan() {
        0.0
    } else {
        rank.clamp(0.0, 1.0)
    }
}

/// Combined score of one document for one query.
///
/// A document whose relevance says `matched = false` scores exactly zero, no
/// matter how popular it is: rank functions are not membership tests and can
/// be non-zero for documents that don't actually match.
pub fn score(doc: &SearchDocument, relevance: RelevanceMatch, factors: PolicyFactors) -> f64 {
    if !relevance.matched {
        return 0.0;
    }

    let redist = if doc.redistributable() {
        NO_PENALTY
    } else {
        factors.redistributable()
    };
    let manifest = if doc.has_dependency_manifest() {
        NO_PENALTY
    } else {
        factors.manifest()
    };

    let score = clamp_rank(relevance.rank) * doc.ln_popularity() * redist * manifest;
    crate::contracts::check_score_bounded(score, doc.ln_popularity());
    score
}
