// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "precision": 14,
//!   "redistributableFactor": 0.5,
//!   "manifestFactor": 1.0,
//!   "noiseFloor": 0.1,
//!   "defaultLimit": 10
//! }
//! ```
//!
//! Every key is optional. Missing keys take the defaults shown above (with
//! `redistributableFactor` defaulting to 1.0, i.e. no penalty).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hll::{Precision, DEFAULT_PRECISION};
use crate::scoring::{PolicyFactors, NOISE_FLOOR, NO_PENALTY};

/// Page size when a query doesn't ask for one.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// HyperLogLog precision bits, 4..=18.
    pub precision: u8,
    /// Multiplier for packages that aren't redistributable, `(0, 1]`.
    pub redistributable_factor: f64,
    /// Multiplier for packages without a dependency manifest, `(0, 1]`.
    pub manifest_factor: f64,
    /// Results scoring at or below this are dropped.
    pub noise_floor: f64,
    pub default_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            redistributable_factor: NO_PENALTY,
            manifest_factor: NO_PENALTY,
            noise_floor: NOISE_FLOOR,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Read and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is usable. Called by both constructors.
    pub fn validate(&self) -> Result<()> {
        self.precision()?;
        self.factors()?;
        if !self.noise_floor.is_finite() || self.noise_floor < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "noiseFloor must be a non-negative number, got {}",
                self.noise_floor
            )));
        }
        if self.default_limit == 0 {
            return Err(Error::InvalidConfig("defaultLimit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn precision(&self) -> Result<Precision> {
        Precision::new(self.precision)
    }

    pub fn factors(&self) -> Result<PolicyFactors> {
        PolicyFactors::new(self.redistributable_factor, self.manifest_factor)
    }
}
