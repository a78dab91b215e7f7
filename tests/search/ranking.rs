//! Ranking order and policy penalties through the full engine.

use chrono::Duration;

use super::common::{engine_with, factors, fixed_time, ids, request};
use pkgrank::{EngineConfig, SearchEngine, SearchRequest, TermRelevance};

#[test]
fn test_equal_scores_newer_commit_first() {
    let engine = SearchEngine::new(TermRelevance, &EngineConfig::default()).unwrap();
    let mut old = request("example.com/a-old", "cache", 10);
    old.commit_time = fixed_time() - Duration::days(30);
    let new = request("example.com/z-new", "cache", 10);
    engine.store().ingest_batch([old, new]);

    let response = engine.search(&SearchRequest::new("cache")).unwrap();
    assert_eq!(ids(&response.results), ["example.com/z-new", "example.com/a-old"]);
}

#[test]
fn test_full_ties_broken_by_id() {
    let engine = engine_with(&[
        ("example.com/c", "cache", 10),
        ("example.com/a", "cache", 10),
        ("example.com/b", "cache", 10),
    ]);
    let response = engine.search(&SearchRequest::new("cache")).unwrap();
    assert_eq!(
        ids(&response.results),
        ["example.com/a", "example.com/b", "example.com/c"]
    );
}

#[test]
fn test_penalty_can_reorder() {
    let engine = SearchEngine::new(TermRelevance, &EngineConfig::default()).unwrap();
    let mut popular = request("example.com/popular", "cache", 1_000);
    popular.has_dependency_manifest = false;
    let modest = request("example.com/modest", "cache", 100);
    engine.store().ingest_batch([popular, modest]);

    // No penalty: popularity decides
    let response = engine.search(&SearchRequest::new("cache")).unwrap();
    assert_eq!(ids(&response.results)[0], "example.com/popular");

    // ln(e+1000)*0.1 ≈ 0.69 < ln(e+100) ≈ 4.62
    let response = engine
        .search(&SearchRequest::new("cache").factors(factors(1.0, 0.1)))
        .unwrap();
    assert_eq!(
        ids(&response.results),
        ["example.com/modest", "example.com/popular"]
    );
}

#[test]
fn test_heavy_penalty_falls_under_noise_floor() {
    let engine = SearchEngine::new(TermRelevance, &EngineConfig::default()).unwrap();
    let mut unlicensed = request("example.com/unlicensed", "cache", 0);
    unlicensed.redistributable = false;
    engine.store().ingest_batch([unlicensed]);

    // 1.0 * ln(e) * 0.05 = 0.05 <= 0.1
    let response = engine
        .search(&SearchRequest::new("cache").factors(factors(0.05, 1.0)))
        .unwrap();
    assert!(response.results.is_empty());

    // Off the page, but still a match.
    assert_eq!(response.estimated_total, 1);
    assert!(response.exact);
    assert_eq!(engine.estimate("cache"), 1);
}

#[test]
fn test_configured_factors_apply_by_default() {
    let config = EngineConfig::from_json_str(r#"{"manifestFactor": 0.1}"#).unwrap();
    let engine = SearchEngine::new(TermRelevance, &config).unwrap();
    let mut popular = request("example.com/popular", "cache", 1_000);
    popular.has_dependency_manifest = false;
    engine
        .store()
        .ingest_batch([popular, request("example.com/modest", "cache", 100)]);

    let response = engine.search(&SearchRequest::new("cache")).unwrap();
    assert_eq!(ids(&response.results)[0], "example.com/modest");
}
