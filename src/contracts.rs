// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for the ranking invariants.
//!
//! Debug-mode assertions on the properties the rest of the crate relies on.
//! They are:
//!
//! 1. **Zero-cost in release builds** (`debug_assert!`)
//! 2. **Early failure detection** during development and in the property tests
//!
//! # INVARIANTS (DO NOT REMOVE THESE CHECKS)
//!
//! Early termination in the selector is only sound while every one of these
//! holds. A silent violation returns a wrong page, not a crash.
//!
//! | Contract Function              | Property                                      |
//! |--------------------------------|-----------------------------------------------|
//! | `check_slot_in_range`          | register < 2^p, 1 <= rank <= 64 - p + 1       |
//! | `check_score_bounded`          | 0 <= score <= ln(e + popularity)              |
//! | `check_popularity_consistent`  | ln == ln(e + count)                           |
//! | `check_popularity_descending`  | candidates arrive in non-increasing ln        |
//! | `check_ranked_order`           | selection buffer sorted by ranking order      |
//! | `check_ranked_results`         | returned page sorted, all above noise floor   |
//!
//! # Usage
//!
//! ```ignore
//! use pkgrank::contracts::*;
//!
//! // In debug builds, this panics if the invariant is violated
//! check_score_bounded(score, doc.ln_popularity());
//!
//! // In release builds, this is a no-op
//! ```

// ============================================================================
// COMPILE-TIME ASSERTIONS (evaluated at build time)
// ============================================================================

/// The constants have to agree with each other, or the crate won't build.
const _: () = {
    use crate::hll::{DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
    use crate::scoring::{NOISE_FLOOR, NO_PENALTY};

    assert!(MIN_PRECISION <= DEFAULT_PRECISION);
    assert!(DEFAULT_PRECISION <= MAX_PRECISION);
    // register index must fit in u32
    assert!(MAX_PRECISION < 32);

    // INVARIANT: a full match with no penalties is never noise.
    // The smallest ln(e + count) is ln(e) = 1.
    const WEAKEST_PERFECT_SCORE: f64 = 1.0 * NO_PENALTY * NO_PENALTY;
    assert!(NOISE_FLOOR < WEAKEST_PERFECT_SCORE);
};

use std::cmp::Ordering;

use crate::hll::Precision;
use crate::scoring::ln_popularity;
use crate::scoring::ranking::{compare_ranked, compare_scored, Scored};
use crate::types::{HashSlot, Popularity, RankedDocument};

/// Absolute slack for float comparisons against `ln`.
const EPSILON: f64 = 1e-9;

// ============================================================================
// HASH SLOT CONTRACTS
// ============================================================================

/// Check that a slot is addressable at `precision`.
///
/// # Panics (debug builds only)
/// Panics if the register is out of range or the rank exceeds `64 - p + 1`.
#[inline]
pub fn check_slot_in_range(slot: HashSlot, precision: Precision) {
    debug_assert!(
        (slot.register() as usize) < precision.registers(),
        "Contract violation: register {} out of range for precision {} ({} registers)",
        slot.register(),
        precision.bits(),
        precision.registers()
    );
    debug_assert!(
        slot.rank() >= 1 && slot.rank() <= 64 - precision.bits() + 1,
        "Contract violation: rank {} out of range [1, {}] for precision {}",
        slot.rank(),
        64 - precision.bits() + 1,
        precision.bits()
    );
}

// ============================================================================
// SCORING CONTRACTS
// ============================================================================

/// Check the pruning bound: a score never exceeds its document's popularity term.
///
/// # Panics (debug builds only)
/// Panics if `score` is negative, NaN, or above `ln_popularity`.
#[inline]
pub fn check_score_bounded(score: f64, ln_popularity: f64) {
    debug_assert!(
        score >= 0.0,
        "Contract violation: score {} is negative or NaN",
        score
    );
    debug_assert!(
        score <= ln_popularity + EPSILON,
        "Contract violation: score {} exceeds popularity bound {}",
        score,
        ln_popularity
    );
}

/// Check that a popularity value's log term matches its count.
#[inline]
pub fn check_popularity_consistent(popularity: Popularity) {
    debug_assert!(
        (popularity.ln() - ln_popularity(popularity.count())).abs() <= EPSILON,
        "Contract violation: ln {} does not match count {}",
        popularity.ln(),
        popularity.count()
    );
}

// ============================================================================
// SELECTION CONTRACTS
// ============================================================================

/// Check that the scan order is non-increasing in popularity.
///
/// # Panics (debug builds only)
/// Panics if `current` is larger than `previous`. Early termination would
/// silently drop results otherwise.
#[inline]
pub fn check_popularity_descending(previous: f64, current: f64) {
    debug_assert!(
        current <= previous,
        "Contract violation: candidate popularity {} follows smaller {}",
        current,
        previous
    );
}

/// Check that the selection buffer is strictly sorted in ranking order.
pub fn check_ranked_order(entries: &[Scored<'_>]) {
    if !cfg!(debug_assertions) {
        return;
    }
    for pair in entries.windows(2) {
        debug_assert!(
            compare_scored(&pair[0], &pair[1]) == Ordering::Less,
            "Contract violation: {} (score {}) ranked before {} (score {})",
            pair[0].doc.id(),
            pair[0].score,
            pair[1].doc.id(),
            pair[1].score
        );
    }
}

/// Check a returned page: sorted, and nothing at or below the noise floor.
pub fn check_ranked_results(results: &[RankedDocument], noise_floor: f64) {
    if !cfg!(debug_assertions) {
        return;
    }
    for pair in results.windows(2) {
        debug_assert!(
            compare_ranked(&pair[0], &pair[1]) == Ordering::Less,
            "Contract violation: {} ranked before {}",
            pair[0].id,
            pair[1].id
        );
    }
    for entry in results {
        debug_assert!(
            entry.score > noise_floor,
            "Contract violation: {} returned with score {} <= noise floor {}",
            entry.id,
            entry.score,
            noise_floor
        );
    }
}
