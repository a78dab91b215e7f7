// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The seam to the lexical-relevance collaborator.
//!
//! The ranking engine doesn't know how text is tokenized or indexed. It asks a
//! [`Relevance`] implementation two things per candidate: how relevant is this
//! document (a rank in `[0, 1]`), and does it actually match (a boolean). The
//! two are kept apart because rank functions are not membership tests.
//!
//! [`TermRelevance`] is a small reference implementation: normalized term
//! sets, AND semantics, rank = fraction of query terms present.

use crate::types::{RelevanceTokens, SearchDocument};
use crate::utils::terms;

/// What the relevance collaborator says about one document for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceMatch {
    /// Normalized relevance rank. Values outside `[0, 1]` are clamped by the scorer.
    pub rank: f64,
    /// Whether the document satisfies the query predicate at all.
    pub matched: bool,
}

impl RelevanceMatch {
    pub const NONE: RelevanceMatch = RelevanceMatch {
        rank: 0.0,
        matched: false,
    };
}

/// Lexical relevance, supplied from outside the ranking core.
pub trait Relevance: Send + Sync {
    /// Parsed form of a query.
    type Query: Send + Sync;

    /// Parse query text. `None` for empty or unparseable input, which the
    /// engine answers with an empty result rather than an error.
    fn parse_query(&self, text: &str) -> Option<Self::Query>;

    /// Build the per-document token handle stored with the document.
    fn tokenize(&self, text: &str) -> RelevanceTokens;

    /// Rank one document against a parsed query.
    fn evaluate(&self, query: &Self::Query, doc: &SearchDocument) -> RelevanceMatch;

    /// The query predicate: does `doc` match at all?
    fn matches(&self, query: &Self::Query, doc: &SearchDocument) -> bool {
        self.evaluate(query, doc).matched
    }
}

/// A parsed [`TermRelevance`] query: sorted, deduplicated terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    terms: Vec<String>,
}

impl TermQuery {
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Term-set relevance: a document matches when it contains every query term.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermRelevance;

fn sorted_terms(text: &str) -> Vec<String> {
    let mut terms = terms(text);
    terms.sort_unstable();
    terms.dedup();
    terms
}

impl Relevance for TermRelevance {
    type Query = TermQuery;

    fn parse_query(&self, text: &str) -> Option<TermQuery> {
        let terms = sorted_terms(text);
        if terms.is_empty() {
            None
        } else {
            Some(TermQuery { terms })
        }
    }

    fn tokenize(&self, text: &str) -> RelevanceTokens {
        RelevanceTokens::from_terms(sorted_terms(text))
    }

    fn evaluate(&self, query: &TermQuery, doc: &SearchDocument) -> RelevanceMatch {
        // Tokens are sorted by `tokenize`, so membership is a binary search
        let doc_terms = doc.tokens().terms();
        let hits = query
            .terms
            .iter()
            .filter(|term| doc_terms.binary_search(*term).is_ok())
            .count();

        if hits == 0 {
            return RelevanceMatch::NONE;
        }

        RelevanceMatch {
            rank: hits as f64 / query.terms.len() as f64,
            matched: hits == query.terms.len(),
        }
    }
}
