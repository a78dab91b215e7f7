//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::collections::HashMap;

use pkgrank::scoring::ranking::compare_ranked;
use pkgrank::{
    score, DocumentId, EngineConfig, PolicyFactors, RankedDocument, Relevance, RelevanceMatch,
    SearchDocument, SearchEngine, SelectRequest, TermRelevance, UpsertRequest,
};

// Re-export canonical test utilities from pkgrank::testing
pub use pkgrank::testing::{doc_id, fixed_time, make_doc, make_doc_at, make_doc_full, make_doc_with_text};

// ============================================================================
// FIXTURES
// ============================================================================

/// A small package corpus: (id, text, popularity).
pub const PACKAGES: &[(&str, &str, u64)] = &[
    ("golang.org/x/net/http2", "http2 client server transport", 48_000),
    ("github.com/gorilla/mux", "http router url matcher", 21_000),
    ("github.com/go-chi/chi", "lightweight http router", 9_500),
    ("github.com/julienschmidt/httprouter", "fast http router", 7_200),
    ("example.com/tiny/router", "router for tiny http servers", 3),
    ("gopkg.in/yaml.v3", "yaml parser encoder", 35_000),
    ("github.com/json-iterator/go", "fast json parser", 12_000),
    ("example.com/unreferenced/json", "json parser", 0),
];

pub fn request(id: &str, text: &str, popularity: u64) -> UpsertRequest {
    UpsertRequest {
        id: id.to_string(),
        tokens: TermRelevance.tokenize(text),
        popularity,
        redistributable: true,
        has_dependency_manifest: true,
        commit_time: fixed_time(),
        symbols: Vec::new(),
    }
}

/// Engine with default config loaded with `docs`.
pub fn engine_with(docs: &[(&str, &str, u64)]) -> SearchEngine<TermRelevance> {
    let engine = SearchEngine::new(TermRelevance, &EngineConfig::default())
        .expect("default config is valid");
    let report = engine
        .store()
        .ingest_batch(docs.iter().map(|(id, text, popularity)| request(id, text, *popularity)));
    assert!(report.rejected.is_empty(), "fixture ids must be valid: {:?}", report.rejected);
    engine
}

pub fn ids(results: &[RankedDocument]) -> Vec<&str> {
    results.iter().map(|r| r.id.as_str()).collect()
}

// ============================================================================
// ORACLES
// ============================================================================

/// Score everything, sort everything, then page. Obviously correct, O(n log n).
pub fn oracle_top_k(
    docs: &[SearchDocument],
    mut relevance: impl FnMut(&SearchDocument) -> RelevanceMatch,
    request: &SelectRequest,
) -> Vec<RankedDocument> {
    let mut all: Vec<RankedDocument> = docs
        .iter()
        .map(|doc| RankedDocument {
            id: doc.id().clone(),
            score: score(doc, relevance(doc), request.factors),
            commit_time: doc.commit_time(),
        })
        .collect();
    all.sort_by(compare_ranked);
    all.into_iter()
        .skip(request.offset)
        .take(request.limit)
        .filter(|r| r.score > request.noise_floor)
        .collect()
}

/// Fixed per-document relevance, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct FixedRelevance(pub HashMap<DocumentId, RelevanceMatch>);

impl FixedRelevance {
    pub fn get(&self, doc: &SearchDocument) -> RelevanceMatch {
        self.0.get(doc.id()).copied().unwrap_or(RelevanceMatch::NONE)
    }
}

pub fn factors(redistributable: f64, manifest: f64) -> PolicyFactors {
    PolicyFactors::new(redistributable, manifest).expect("valid test factors")
}
