// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the cardinality estimator.
//!
//! Whatever maxima the registers hold, including ones no real hash could
//! produce, the estimate is a finite, non-negative number.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgrank::hll::{estimate_from_maxima, RegisterMaxima};
use pkgrank::Precision;

fuzz_target!(|data: (u8, Vec<u8>)| {
    let (bits, ranks) = data;
    let bits = pkgrank::hll::MIN_PRECISION + bits % 7; // up to 2^10 registers
    let precision = Precision::new(bits).unwrap();
    let max_rank = 64 - bits + 1;

    let mut maxima = RegisterMaxima::empty(precision);
    for (register, rank) in ranks.into_iter().take(precision.registers()).enumerate() {
        maxima.set(register as u32, rank % (max_rank + 1));
    }

    let estimate = estimate_from_maxima(&maxima);
    assert!(estimate.is_finite(), "estimate {} not finite", estimate);
    assert!(estimate >= 0.0, "estimate {} negative", estimate);
});
