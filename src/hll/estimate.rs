// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Cardinality estimation from per-register rank maxima.
//!
//! # The estimator
//!
//! With `m` registers and `M[r]` the maximum rank observed in register `r`:
//!
//! ```text
//! E = α_m · m² / Σ 2^(-M[r])
//! ```
//!
//! | m     | α_m                      |
//! |-------|--------------------------|
//! | 16    | 0.673                    |
//! | 32    | 0.697                    |
//! | 64    | 0.709                    |
//! | ≥ 128 | 0.7213 / (1 + 1.079 / m) |
//!
//! Corrections (Flajolet et al. 2007, adapted to a 64-bit hash):
//!
//! - **Small range**: `E ≤ 2.5·m` and `V > 0` empty registers → linear counting,
//!   `m · ln(m / V)`.
//! - **Large range**: `E > 2^64 / 30` → `-2^64 · ln(1 - E / 2^64)`. With 64-bit
//!   hashes this never fires for realistic corpora, but it keeps the estimator
//!   total.
//!
//! Anything that comes out negative, NaN or infinite is clamped to zero.

use crate::contracts;
use crate::types::SearchDocument;

use super::Precision;

/// Linear counting threshold, as a multiple of `m`.
const SMALL_RANGE_FACTOR: f64 = 2.5;

/// `2^64` as a float.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Maximum rank per register for some predicate. Zero means "no match".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMaxima {
    ranks: Vec<u8>,
}

impl RegisterMaxima {
    /// All-zero maxima (nothing matched).
    pub fn empty(precision: Precision) -> Self {
        Self {
            ranks: vec![0; precision.registers()],
        }
    }

    /// Raise register `register` to at least `rank`.
    #[inline]
    pub fn observe(&mut self, register: u32, rank: u8) {
        let slot = &mut self.ranks[register as usize];
        if rank > *slot {
            *slot = rank;
        }
    }

    /// Overwrite a register. Used by lookups that already know the maximum.
    #[inline]
    pub fn set(&mut self, register: u32, rank: u8) {
        self.ranks[register as usize] = rank;
    }

    pub fn ranks(&self) -> &[u8] {
        &self.ranks
    }

    pub fn registers(&self) -> usize {
        self.ranks.len()
    }

    /// Number of registers no matching document landed in.
    pub fn zero_registers(&self) -> usize {
        self.ranks.iter().filter(|&&r| r == 0).count()
    }
}

/// Storage capability: "max rank per register, filtered by predicate".
///
/// Implementations should avoid touching every document: the in-memory store
/// keeps an index ordered by `(register, rank desc)` and stops each register's
/// scan at the first match.
pub trait RegisterLookup {
    fn register_maxima(
        &self,
        precision: Precision,
        predicate: &dyn Fn(&SearchDocument) -> bool,
    ) -> RegisterMaxima;
}

/// Brute-force lookup over a plain slice. Fine for tests and small corpora.
impl RegisterLookup for [SearchDocument] {
    fn register_maxima(
        &self,
        precision: Precision,
        predicate: &dyn Fn(&SearchDocument) -> bool,
    ) -> RegisterMaxima {
        let mut maxima = RegisterMaxima::empty(precision);
        for doc in self.iter().filter(|doc| predicate(doc)) {
            let slot = doc.slot();
            contracts::check_slot_in_range(slot, precision);
            maxima.observe(slot.register(), slot.rank());
        }
        maxima
    }
}

impl RegisterLookup for Vec<SearchDocument> {
    fn register_maxima(
        &self,
        precision: Precision,
        predicate: &dyn Fn(&SearchDocument) -> bool,
    ) -> RegisterMaxima {
        self.as_slice().register_maxima(precision, predicate)
    }
}

/// Bias constant `α_m`.
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

/// Raw HyperLogLog estimate with small- and large-range corrections.
///
/// Returns a finite, non-negative float.
pub fn estimate_from_maxima(maxima: &RegisterMaxima) -> f64 {
    let m = maxima.registers();
    let mf = m as f64;

    let sum: f64 = maxima
        .ranks()
        .iter()
        .map(|&rank| 2f64.powi(-i32::from(rank)))
        .sum();
    let raw = alpha(m) * mf * mf / sum;

    let corrected = if raw <= SMALL_RANGE_FACTOR * mf {
        let zeros = maxima.zero_registers();
        if zeros > 0 {
            mf * (mf / zeros as f64).ln()
        } else {
            raw
        }
    } else if raw > TWO_POW_64 / 30.0 {
        -TWO_POW_64 * (1.0 - raw / TWO_POW_64).ln()
    } else {
        raw
    };

    clamp_estimate(corrected)
}

/// NaN, infinities and negatives all become zero.
#[inline]
fn clamp_estimate(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `estimateCount(predicate)`: approximate number of matching documents.
pub fn estimate_count<L>(
    lookup: &L,
    precision: Precision,
    predicate: &dyn Fn(&SearchDocument) -> bool,
) -> u64
where
    L: RegisterLookup + ?Sized,
{
    let maxima = lookup.register_maxima(precision, predicate);
    let estimate = estimate_from_maxima(&maxima).round();
    tracing::debug!(
        registers = maxima.registers(),
        zero_registers = maxima.zero_registers(),
        estimate,
        "estimated result count"
    );
    estimate as u64
}
