// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded top-K selection with popularity-bound pruning.
//!
//! Scanning the whole corpus for every query is the thing to avoid. The trick
//! is the scan order: candidates arrive in descending `ln(e + popularity)`, and
//! a document's score can never exceed its own `ln(e + popularity)` (see
//! [`crate::scoring`]). So once the worst entry we're holding beats the next
//! candidate's popularity, it beats every remaining candidate's *score* too,
//! and the scan can stop.
//!
//! ```text
//!   candidates (ln desc)   5.9  5.1  4.8  3.0  2.2  1.9  1.4 ...
//!   scores                 4.1  0.0  4.5  2.9  ─── stop: worst kept (2.9) > 2.2
//! ```
//!
//! **Invariant**: the selection equals a full sort of every candidate,
//! truncated to `[offset, offset + limit)` and filtered by the noise floor.
//!
//! **Verified by**:
//! - `prop_select_matches_full_sort` (tests/property/selection.rs)
//! - `prop_pruning_never_drops_true_top_k` (tests/property/selection.rs)
//! - `fuzz_targets/topk_selection.rs`

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::contracts;
use crate::error::{Error, Result};
use crate::relevance::RelevanceMatch;
use crate::scoring::ranking::{compare_scored, Scored};
use crate::scoring::{score, PolicyFactors, NOISE_FLOOR};
use crate::types::{RankedDocument, SearchDocument};

/// Upper bound on the buffer preallocation, so a huge `offset` doesn't
/// allocate before we know how many documents actually match.
const MAX_PREALLOCATED: usize = 1024;

/// Storage capability: "documents ordered by popularity, descending".
///
/// Ties in popularity may come in any order; the ranking tie-breaks don't
/// depend on scan order.
pub trait PopularityScan {
    fn scan_by_popularity(&self) -> Box<dyn Iterator<Item = &SearchDocument> + '_>;
}

/// Sorts on every call. Fine for tests and small corpora.
impl PopularityScan for [SearchDocument] {
    fn scan_by_popularity(&self) -> Box<dyn Iterator<Item = &SearchDocument> + '_> {
        let mut docs: Vec<&SearchDocument> = self.iter().collect();
        docs.sort_by(|a, b| {
            b.popularity()
                .count()
                .cmp(&a.popularity().count())
                .then_with(|| a.id().cmp(b.id()))
        });
        Box::new(docs.into_iter())
    }
}

impl PopularityScan for Vec<SearchDocument> {
    fn scan_by_popularity(&self) -> Box<dyn Iterator<Item = &SearchDocument> + '_> {
        self.as_slice().scan_by_popularity()
    }
}

/// Cooperative cancellation for a running selection.
///
/// Clone it, hand one copy to the query and keep the other; raising it makes
/// the selector stop at the next candidate.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Page and policy parameters for one selection.
#[derive(Debug, Clone, Copy)]
pub struct SelectRequest {
    pub limit: usize,
    pub offset: usize,
    pub factors: PolicyFactors,
    /// Entries scoring at or below this are dropped from the page.
    pub noise_floor: f64,
}

impl SelectRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            factors: PolicyFactors::default(),
            noise_floor: NOISE_FLOOR,
        }
    }

    pub fn with_factors(mut self, factors: PolicyFactors) -> Self {
        self.factors = factors;
        self
    }

    /// Buffer size `N = offset + limit`.
    pub fn depth(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

/// What the scan did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    /// Candidates scored.
    pub scanned: usize,
    /// Candidates that entered the buffer (including ones later evicted).
    pub inserted: usize,
    /// Scanned candidates the relevance collaborator called a match,
    /// whatever their score.
    pub matched: usize,
    /// Whether the scan stopped early on the popularity bound.
    pub pruned: bool,
    /// Whether every candidate was scanned. When set, `matched` is the
    /// exact number of matching documents.
    pub exhausted: bool,
}

/// A ranked page plus scan statistics.
#[derive(Debug, Clone)]
pub struct Selection {
    pub results: Vec<RankedDocument>,
    pub stats: SelectionStats,
}

/// Fixed-capacity buffer kept sorted by ranking order.
///
/// Insertion is a binary search plus a shift, `O(log N + N)`, which beats a
/// heap for the small `N` of a result page and keeps the contents in final
/// order at all times.
#[derive(Debug)]
pub struct BoundedTopK<'a> {
    capacity: usize,
    entries: Vec<Scored<'a>>,
}

impl<'a> BoundedTopK<'a> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(MAX_PREALLOCATED)),
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The lowest-ranked entry currently kept.
    pub fn worst(&self) -> Option<&Scored<'a>> {
        self.entries.last()
    }

    /// Insert `candidate` if it belongs in the buffer. Returns whether it was kept.
    ///
    /// When full, the current last entry is dropped to make room.
    pub fn offer(&mut self, candidate: Scored<'a>) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let position = self
            .entries
            .partition_point(|kept| compare_scored(kept, &candidate).is_lt());
        if position >= self.capacity {
            return false;
        }

        if self.is_full() {
            self.entries.pop();
        }
        self.entries.insert(position, candidate);
        true
    }

    pub fn as_slice(&self) -> &[Scored<'a>] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Scored<'a>> {
        self.entries
    }
}

/// `selectTopK`: the exact `[offset, offset + limit)` page of the full ranking.
///
/// `candidates` must yield documents in descending popularity; the early
/// termination is unsound otherwise (checked by a debug contract). `relevance`
/// is called once per scanned candidate.
///
/// Returns [`Error::Cancelled`] if `cancel` is raised mid-scan. Nothing is
/// written either way.
pub fn select_top_k<'a, I, F>(
    candidates: I,
    mut relevance: F,
    request: &SelectRequest,
    cancel: Option<&CancelFlag>,
) -> Result<Selection>
where
    I: IntoIterator<Item = &'a SearchDocument>,
    F: FnMut(&SearchDocument) -> RelevanceMatch,
{
    let mut stats = SelectionStats::default();
    if request.limit == 0 {
        return Ok(Selection {
            results: Vec::new(),
            stats,
        });
    }

    let mut top = BoundedTopK::new(request.depth());
    let mut previous_ln = f64::INFINITY;

    for doc in candidates {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            return Err(Error::Cancelled {
                scanned: stats.scanned,
            });
        }

        let bound = doc.ln_popularity();
        contracts::check_popularity_descending(previous_ln, bound);
        previous_ln = bound;

        // Nothing from here on can score above `bound`.
        if top.is_full() && top.worst().is_some_and(|worst| worst.score > bound) {
            stats.pruned = true;
            break;
        }

        stats.scanned += 1;
        let relevance = relevance(doc);
        if relevance.matched {
            stats.matched += 1;
        }
        let scored = Scored {
            doc,
            score: score(doc, relevance, request.factors),
        };
        if top.offer(scored) {
            stats.inserted += 1;
        }
    }

    stats.exhausted = !stats.pruned;
    contracts::check_ranked_order(top.as_slice());

    let results: Vec<RankedDocument> = top
        .into_vec()
        .into_iter()
        .skip(request.offset)
        .take(request.limit)
        .filter(|entry| entry.score > request.noise_floor)
        .map(|entry| entry.to_ranked())
        .collect();

    tracing::debug!(
        scanned = stats.scanned,
        inserted = stats.inserted,
        matched = stats.matched,
        pruned = stats.pruned,
        returned = results.len(),
        "top-k selection finished"
    );

    Ok(Selection { results, stats })
}
