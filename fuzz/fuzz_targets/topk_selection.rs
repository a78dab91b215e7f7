// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for top-K selection.
//!
//! Early termination is the one place a wrong page can hide behind a correct
//! looking result. The fuzzer picks popularities, relevance ranks, flags and
//! page bounds; the pruned selector must agree with a full sort every time.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pkgrank::scoring::ranking::compare_ranked;
use pkgrank::testing::make_doc_full;
use pkgrank::testing::fixed_time;
use pkgrank::{
    score, select_top_k, PolicyFactors, PopularityScan, RankedDocument, RelevanceMatch,
    SearchDocument, SelectRequest,
};

#[derive(Debug, Arbitrary)]
struct Doc {
    popularity: u32,
    rank: u8,
    matched: bool,
    redistributable: bool,
    has_manifest: bool,
    age_days: u8,
}

#[derive(Debug, Arbitrary)]
struct Input {
    docs: Vec<Doc>,
    limit: u8,
    offset: u8,
    redist_factor: u8,
    manifest_factor: u8,
}

/// Map a byte onto (0, 1].
fn factor(byte: u8) -> f64 {
    (f64::from(byte) + 1.0) / 256.0
}

fuzz_target!(|input: Input| {
    let docs: Vec<SearchDocument> = input
        .docs
        .iter()
        .take(200)
        .enumerate()
        .map(|(i, d)| {
            make_doc_full(
                &format!("example.com/p{}", i),
                "",
                u64::from(d.popularity),
                d.redistributable,
                d.has_manifest,
                fixed_time() - chrono::Duration::days(i64::from(d.age_days)),
            )
        })
        .collect();
    let relevance = |doc: &SearchDocument| {
        let index: usize = doc.id().as_str()["example.com/p".len()..].parse().unwrap();
        let d = &input.docs[index];
        RelevanceMatch {
            rank: f64::from(d.rank) / 255.0,
            matched: d.matched,
        }
    };

    let factors = PolicyFactors::new(factor(input.redist_factor), factor(input.manifest_factor)).unwrap();
    let request = SelectRequest::new(usize::from(input.limit), usize::from(input.offset)).with_factors(factors);

    let got = select_top_k(docs.scan_by_popularity(), relevance, &request, None)
        .unwrap()
        .results;

    let mut all: Vec<RankedDocument> = docs
        .iter()
        .map(|doc| RankedDocument {
            id: doc.id().clone(),
            score: score(doc, relevance(doc), factors),
            commit_time: doc.commit_time(),
        })
        .collect();
    all.sort_by(compare_ranked);
    let expected: Vec<RankedDocument> = all
        .into_iter()
        .skip(request.offset)
        .take(request.limit)
        .filter(|r| r.score > request.noise_floor)
        .collect();

    assert_eq!(got, expected, "pruned selection diverged from full sort");
});
