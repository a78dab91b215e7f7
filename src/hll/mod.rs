// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! HyperLogLog over per-document hash slots.
//!
//! The usual HyperLogLog adds items to a register array and throws the items
//! away. Here it's the other way round: every document keeps its own
//! `(register, rank)` slot forever, and a count estimate for a query is
//! computed on demand by taking, per register, the maximum rank among the
//! documents that match. That turns "how many packages match `http`?" into
//! one max-per-register lookup instead of a full scan.
//!
//! - [`assign`]: id → slot, exactly once per document identity.
//! - [`estimate`]: register maxima → distinct-count estimate.
//!
//! Standard error is `1.04 / sqrt(m)`:
//! - precision=10: m=1024, ≈ 3.25%
//! - precision=12: m=4096, ≈ 1.63%
//! - precision=14: m=16384, ≈ 0.81% (default)

pub mod assign;
pub mod estimate;

pub use assign::{assign, assign_identity};
pub use estimate::{estimate_count, estimate_from_maxima, RegisterLookup, RegisterMaxima};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest supported precision (16 registers).
pub const MIN_PRECISION: u8 = 4;

/// Largest supported precision (262144 registers).
pub const MAX_PRECISION: u8 = 18;

/// Default precision: 16384 registers, ≈ 0.81% standard error.
pub const DEFAULT_PRECISION: u8 = 14;

/// Number of register-selection bits, `P`. There are `2^P` registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Precision(u8);

impl Precision {
    pub fn new(bits: u8) -> Result<Self> {
        if (MIN_PRECISION..=MAX_PRECISION).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(Error::InvalidPrecision(bits))
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// `R = 2^P`.
    #[inline]
    pub fn registers(self) -> usize {
        1usize << self.0
    }

    /// Theoretical relative standard error, `1.04 / sqrt(R)`.
    pub fn standard_error(self) -> f64 {
        1.04 / (self.registers() as f64).sqrt()
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(DEFAULT_PRECISION)
    }
}

impl TryFrom<u8> for Precision {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        Self::new(bits)
    }
}

impl From<Precision> for u8 {
    fn from(p: Precision) -> Self {
        p.0
    }
}
