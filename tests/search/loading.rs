//! Loading corpora and configs from disk, the way the CLI does.

use std::io::Write;

use tempfile::NamedTempFile;

use super::common::ids;
use pkgrank::{Corpus, EngineConfig, Error, SearchEngine, SearchRequest, TermRelevance};

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CORPUS: &str = r#"{
  "documents": [
    {
      "id": "golang.org/x/net/http2",
      "text": "HTTP/2 client and server",
      "popularity": 48213,
      "commitTime": "2024-03-01T12:00:00Z",
      "symbols": ["Transport", "Server"]
    },
    {
      "id": "github.com/example/proprietary-http",
      "text": "http client",
      "popularity": 90000,
      "redistributable": false
    },
    {
      "id": "not a valid id",
      "text": "http"
    }
  ]
}"#;

#[test]
fn test_corpus_round_trip_through_engine() {
    let corpus_file = write_temp(CORPUS);
    let config_file = write_temp(r#"{"redistributableFactor": 0.01, "defaultLimit": 5}"#);

    let config = EngineConfig::from_path(config_file.path()).unwrap();
    let engine = SearchEngine::new(TermRelevance, &config).unwrap();
    let corpus = Corpus::from_path(corpus_file.path()).unwrap();
    assert_eq!(corpus.len(), 3);

    let report = engine
        .store()
        .ingest_batch(corpus.into_requests(engine.relevance()));
    assert_eq!(report.created, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].id, "not a valid id");

    // ln(e + 90000) * 0.01 ≈ 0.11, still above the floor but below http2
    let response = engine.search(&SearchRequest::new("http client")).unwrap();
    assert_eq!(
        ids(&response.results),
        ["golang.org/x/net/http2", "github.com/example/proprietary-http"]
    );

    let snapshot = engine.store().snapshot();
    let http2 = pkgrank::DocumentId::parse("golang.org/x/net/http2").unwrap();
    assert_eq!(snapshot.symbols(&http2).len(), 2);
}

#[test]
fn test_malformed_corpus_is_json_error() {
    let file = write_temp(r#"{"documents": [{"text": "missing id"}]}"#);
    assert!(matches!(Corpus::from_path(file.path()), Err(Error::Json(_))));
}

#[test]
fn test_missing_corpus_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Corpus::from_path(dir.path().join("absent.json")).unwrap_err();
    match err {
        Error::Io { path, .. } => assert!(path.ends_with("absent.json")),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_invalid_config_file_rejected() {
    let file = write_temp(r#"{"precision": 2}"#);
    assert!(matches!(
        EngineConfig::from_path(file.path()),
        Err(Error::InvalidPrecision(2))
    ));
}
