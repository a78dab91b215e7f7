// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hash assignment: document id → `(register, rank)`.
//!
//! xxHash64 with a fixed seed over the id's UTF-8 bytes. The low `P` bits pick
//! the register; the rank is one plus the number of leading zeros in the
//! remaining `64 - P` bits.
//!
//! The hash must be stable across processes and releases, which rules out
//! `std`'s `DefaultHasher` (randomly keyed `RandomState`, and its algorithm is
//! explicitly unspecified).

use twox_hash::XxHash64;

use super::Precision;
use crate::types::{DocumentId, HashSlot, Identity};

/// Seed for slot hashing. Changing it reshuffles every stored slot.
const SLOT_HASH_SEED: u64 = 0;

/// Stable 64-bit hash of a document id.
#[inline]
pub fn hash_id(id: &str) -> u64 {
    XxHash64::oneshot(SLOT_HASH_SEED, id.as_bytes())
}

/// Split a 64-bit hash into a slot.
///
/// `rank` ranges over `1..=64 - P + 1`; the top value means every non-register
/// bit was zero.
#[inline]
pub fn slot_from_hash(hash: u64, precision: Precision) -> HashSlot {
    let p = u32::from(precision.bits());
    let register = (hash & ((1u64 << p) - 1)) as u32;
    let rest = hash >> p;
    // `rest` has at most 64 - p significant bits; its top p bits are always zero
    let rank = if rest == 0 {
        64 - p + 1
    } else {
        rest.leading_zeros() - p + 1
    };
    HashSlot::new(register, rank as u8)
}

/// `assign(documentID) -> (register, rank)`.
pub fn assign(id: &DocumentId, precision: Precision) -> HashSlot {
    slot_from_hash(hash_id(id.as_str()), precision)
}

/// Build the immutable identity of a document. Called once, at first creation.
pub fn assign_identity(id: DocumentId, precision: Precision) -> Identity {
    let slot = assign(&id, precision);
    crate::contracts::check_slot_in_range(slot, precision);
    Identity::new(id, slot)
}
