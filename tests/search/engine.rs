//! Engine behavior: totals, determinism, snapshots and cancellation.

use std::sync::Arc;
use std::thread;

use super::common::{doc_id, engine_with, ids, request, PACKAGES};
use pkgrank::{
    CancelFlag, EngineConfig, Error, SearchEngine, SearchRequest, SearchResponse, TermRelevance,
    UpdateOutcome,
};

#[test]
fn test_empty_query_is_empty_not_error() {
    let engine = engine_with(PACKAGES);
    for query in ["", "   ", "/-.", "\t"] {
        assert_eq!(
            engine.search(&SearchRequest::new(query)).unwrap(),
            SearchResponse::empty()
        );
    }
}

#[test]
fn test_short_page_total_exact() {
    let engine = engine_with(PACKAGES);
    let response = engine.search(&SearchRequest::new("json")).unwrap();
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.estimated_total, 2);
    assert!(response.exact);
}

#[test]
fn test_full_page_total_never_below_page() {
    let engine = engine_with(PACKAGES);
    let response = engine
        .search(&SearchRequest::new("http").limit(2).offset(1))
        .unwrap();
    assert_eq!(response.results.len(), 2);
    assert!(!response.exact);
    assert!(response.estimated_total >= 3);
}

#[test]
fn test_estimate_matches_small_counts() {
    let engine = engine_with(PACKAGES);
    assert_eq!(engine.estimate("router"), 4);
    assert_eq!(engine.estimate("parser"), 3);
    assert_eq!(engine.estimate("nothing"), 0);
    assert_eq!(engine.estimate(""), 0);
}

#[test]
fn test_ingest_order_does_not_matter() {
    let forward = engine_with(PACKAGES);
    let reversed: Vec<_> = PACKAGES.iter().rev().copied().collect();
    let backward = engine_with(&reversed);

    for query in ["http", "router", "parser", "json parser"] {
        for (limit, offset) in [(1, 0), (3, 0), (3, 2), (10, 0)] {
            let request = SearchRequest::new(query).limit(limit).offset(offset);
            assert_eq!(
                forward.search(&request).unwrap(),
                backward.search(&request).unwrap(),
                "query={:?}",
                query
            );
        }
    }
}

#[test]
fn test_popularity_feed_changes_ranking() {
    let engine = engine_with(PACKAGES);
    let tiny = doc_id("example.com/tiny/router");

    let before = engine.search(&SearchRequest::new("router")).unwrap();
    assert_eq!(ids(&before.results).last(), Some(&"example.com/tiny/router"));

    assert_eq!(
        engine.store().on_reference_graph_change(&tiny, 10_000_000),
        UpdateOutcome::Applied
    );
    let after = engine.search(&SearchRequest::new("router")).unwrap();
    assert_eq!(ids(&after.results)[0], "example.com/tiny/router");
}

#[test]
fn test_takedown_removes_from_results_and_counts() {
    let engine = engine_with(PACKAGES);
    assert!(engine.store().remove(&doc_id("gopkg.in/yaml.v3")));

    let response = engine.search(&SearchRequest::new("yaml")).unwrap();
    assert!(response.results.is_empty());
    assert_eq!(engine.estimate("yaml"), 0);
}

#[test]
fn test_cancelled_search() {
    let engine = engine_with(PACKAGES);
    let cancel = CancelFlag::new();
    let handle = cancel.clone();
    handle.cancel();

    let err = engine
        .search_with_cancel(&SearchRequest::new("http"), &cancel)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled { scanned: 0 }));

    // Nothing was written: an uncancelled search still works
    assert!(!engine.search(&SearchRequest::new("http")).unwrap().results.is_empty());
}

#[test]
fn test_concurrent_reads_and_writes() {
    let engine = Arc::new(engine_with(PACKAGES));
    let mut handles = Vec::new();

    for i in 0..4u64 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for n in 0..50u64 {
                let id = format!("example.com/writer{}/pkg{}", i, n);
                engine.store().upsert(request(&id, "router", n)).unwrap();
                let response = engine.search(&SearchRequest::new("router")).unwrap();
                assert!(!response.results.is_empty());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.store().len(), PACKAGES.len() + 200);
}

#[test]
fn test_store_shared_between_engines() {
    let first = engine_with(PACKAGES);
    let second = SearchEngine::with_store(
        TermRelevance,
        Arc::clone(first.store()),
        &EngineConfig::default(),
    )
    .unwrap();
    first
        .store()
        .upsert(request("example.com/new/router", "router", 1))
        .unwrap();
    assert_eq!(second.estimate("router"), 5);
}
