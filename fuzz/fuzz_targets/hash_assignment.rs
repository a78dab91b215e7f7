// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for hash slot assignment.
//!
//! Any string that survives id validation gets a slot, and that slot is in
//! range at every precision and identical across calls. Strings that don't
//! survive must be rejected with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgrank::hll::assign::{hash_id, slot_from_hash};
use pkgrank::{assign, DocumentId, Precision};

fuzz_target!(|data: (&str, u64)| {
    let (raw, hash) = data;

    // Raw hashes: every split must be in range
    for bits in pkgrank::hll::MIN_PRECISION..=pkgrank::hll::MAX_PRECISION {
        let precision = Precision::new(bits).unwrap();
        let slot = slot_from_hash(hash, precision);
        assert!((slot.register() as usize) < precision.registers());
        assert!(slot.rank() >= 1 && slot.rank() <= 64 - bits + 1);
    }

    let Ok(id) = DocumentId::parse(raw) else {
        return;
    };
    let precision = Precision::default();
    let first = assign(&id, precision);
    assert_eq!(first, assign(&id, precision), "assignment not deterministic");
    assert_eq!(first, slot_from_hash(hash_id(raw), precision));
});
