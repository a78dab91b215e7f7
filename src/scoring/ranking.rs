// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result ranking: how scored documents get sorted.
//!
//! Sort order:
//! 1. **Score** - descending
//! 2. **Commit time** - descending (newer versions first)
//! 3. **Document id** - ascending, byte order
//!
//! Document ids are unique, so the order is total: two distinct documents
//! never compare equal, and the same corpus always ranks the same way.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::{DocumentId, RankedDocument, SearchDocument};

/// A document paired with its score for the current query.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub doc: &'a SearchDocument,
    pub score: f64,
}

impl Scored<'_> {
    pub fn to_ranked(&self) -> RankedDocument {
        RankedDocument {
            id: self.doc.id().clone(),
            score: self.score,
            commit_time: self.doc.commit_time(),
        }
    }
}

/// The ranking key, borrowed from whatever holds it.
#[inline]
fn compare_keys(
    (a_score, a_time, a_id): (f64, DateTime<Utc>, &DocumentId),
    (b_score, b_time, b_id): (f64, DateTime<Utc>, &DocumentId),
) -> Ordering {
    // Primary: score (descending - higher score wins)
    b_score
        .total_cmp(&a_score)
        // Secondary: commit time (descending - newer wins)
        .then_with(|| b_time.cmp(&a_time))
        // Final tie-breaker: id for absolute determinism
        .then_with(|| a_id.cmp(b_id))
}

/// Compare two scored documents for ranking. `Less` means `a` ranks first.
pub fn compare_scored(a: &Scored<'_>, b: &Scored<'_>) -> Ordering {
    compare_keys(
        (a.score, a.doc.commit_time(), a.doc.id()),
        (b.score, b.doc.commit_time(), b.doc.id()),
    )
}

/// Same order as [`compare_scored`], for owned result entries.
pub fn compare_ranked(a: &RankedDocument, b: &RankedDocument) -> Ordering {
    compare_keys(
        (a.score, a.commit_time, &a.id),
        (b.score, b.commit_time, &b.id),
    )
}
