// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for arbitrary query text.
//!
//! No query may panic. Results are deterministic, ordered, above the noise
//! floor, and the reported total never undercuts the page.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgrank::{
    compare_ranked, EngineConfig, Relevance, SearchEngine, SearchRequest, TermRelevance,
    UpsertRequest, NOISE_FLOOR,
};

const CORPUS: &[(&str, &str, u64)] = &[
    ("golang.org/x/net/http2", "http2 client server", 48_000),
    ("github.com/gorilla/mux", "http router", 21_000),
    ("gopkg.in/yaml.v3", "yaml parser", 35_000),
    ("example.com/café", "café naïve résumé", 3),
    ("example.com/empty", "", 0),
];

fuzz_target!(|data: (&str, u8, u8)| {
    static ENGINE: std::sync::OnceLock<SearchEngine<TermRelevance>> = std::sync::OnceLock::new();
    let engine = ENGINE.get_or_init(|| {
        let engine = SearchEngine::new(TermRelevance, &EngineConfig::default()).unwrap();
        engine.store().ingest_batch(CORPUS.iter().map(|(id, text, popularity)| UpsertRequest {
            id: id.to_string(),
            tokens: TermRelevance.tokenize(text),
            popularity: *popularity,
            redistributable: true,
            has_dependency_manifest: true,
            commit_time: pkgrank::testing::fixed_time(),
            symbols: Vec::new(),
        }));
        engine
    });

    let (query, limit, offset) = data;
    // Cap query length, on a char boundary
    let query: String = query.chars().take(200).collect();
    let request = SearchRequest::new(query)
        .limit(usize::from(limit % 16))
        .offset(usize::from(offset % 8));

    let first = engine.search(&request).unwrap();
    let second = engine.search(&request).unwrap();
    assert_eq!(first, second, "search not deterministic");

    for pair in first.results.windows(2) {
        assert!(compare_ranked(&pair[0], &pair[1]).is_lt());
    }
    for result in &first.results {
        assert!(result.score > NOISE_FLOOR);
    }
    assert!(first.estimated_total >= (request.offset + first.results.len()) as u64 || first.results.is_empty());
});
