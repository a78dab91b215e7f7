// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! Every helper uses a fixed commit time and the default precision, so
//! tests don't depend on the wall clock.

#![doc(hidden)]

use chrono::{DateTime, Utc};

use crate::hll::Precision;
use crate::relevance::{Relevance, TermRelevance};
use crate::types::{DocumentContent, DocumentId, Popularity, RelevanceTokens, SearchDocument};

/// Commit time used by every helper that doesn't take one.
pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// Parse an id that is known to be valid. Panics otherwise.
pub fn doc_id(raw: &str) -> DocumentId {
    DocumentId::parse(raw).unwrap_or_else(|e| panic!("bad test id {:?}: {}", raw, e))
}

/// Create a document with every field spelled out.
///
/// This is the canonical implementation the other helpers delegate to.
pub fn make_doc_full(
    id: &str,
    text: &str,
    popularity: u64,
    redistributable: bool,
    has_manifest: bool,
    commit_time: DateTime<Utc>,
) -> SearchDocument {
    SearchDocument::new(
        doc_id(id),
        DocumentContent {
            tokens: TermRelevance.tokenize(text),
            redistributable,
            has_dependency_manifest: has_manifest,
            commit_time,
        },
        Popularity::new(popularity, commit_time),
        Precision::default(),
    )
}

/// Create a document with policy flags and no text.
pub fn make_doc(id: &str, popularity: u64, redistributable: bool, has_manifest: bool) -> SearchDocument {
    make_doc_full(id, "", popularity, redistributable, has_manifest, fixed_time())
}

/// Create a clean (no penalties) document with a specific commit time.
pub fn make_doc_at(id: &str, popularity: u64, commit_time: DateTime<Utc>) -> SearchDocument {
    make_doc_full(id, "", popularity, true, true, commit_time)
}

/// Create a clean document whose tokens come from `text`.
pub fn make_doc_with_text(id: &str, text: &str, popularity: u64) -> SearchDocument {
    make_doc_full(id, text, popularity, true, true, fixed_time())
}

/// Content for store upserts.
pub fn make_content(text: &str, commit_time: DateTime<Utc>) -> DocumentContent {
    DocumentContent {
        tokens: TermRelevance.tokenize(text),
        redistributable: true,
        has_dependency_manifest: true,
        commit_time,
    }
}

/// Empty token set, for tests that don't query.
pub fn no_tokens() -> RelevanceTokens {
    RelevanceTokens::default()
}
