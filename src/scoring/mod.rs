// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring and ranking: how search results get their numbers.
//!
//! The key property is that popularity bounds everything. Relevance and the
//! policy penalties can only shrink a document's `ln(e + popularity)`, never
//! grow it, and that's what lets the selector stop scanning early.

mod core;
pub mod ranking;

pub use core::*;
