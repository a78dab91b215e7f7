// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Popularity-ranked package search with approximate result counts.
//!
//! Given a text query, `pkgrank` returns a short, exactly-ordered top-K page of
//! matching packages and an approximate count of all matches, without scanning
//! the whole corpus per query.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ hll::assign │──▶│    store     │──▶│  hll::estimate   │──▶ estimated_total
//! │ (id → slot) │   │ (snapshots,  │   │ (register maxima)│
//! └─────────────┘   │  indexes)    │   └──────────────────┘
//!                   │              │   ┌──────────────────┐
//!  popularity feed─▶│              │──▶│ select (top-K,   │──▶ results
//!                   └──────────────┘   │  early stop)     │
//!                                      └────────┬─────────┘
//!                                               │ scoring
//!                                               ▼
//!                               rank × ln(e + popularity) × penalties
//! ```
//!
//! # Key Properties
//!
//! | Module            | Property                                           |
//! |-------------------|----------------------------------------------------|
//! | `hll::assign`     | slot is a pure function of the id, assigned once   |
//! | `hll::estimate`   | ≈ 1.04/√m relative error, never NaN or negative    |
//! | `scoring`         | `score ≤ ln(e + popularity)` for every query       |
//! | `select`          | result equals full sort, truncated and filtered    |
//! | `store`           | snapshot reads, last-writer-wins updates           |
//!
//! # Usage
//!
//! ```ignore
//! use pkgrank::{EngineConfig, SearchEngine, SearchRequest, TermRelevance, UpsertRequest};
//!
//! let engine = SearchEngine::new(TermRelevance, &EngineConfig::default())?;
//! engine.store().upsert(UpsertRequest { ... })?;
//!
//! let response = engine.search(&SearchRequest::new("http router").limit(10))?;
//! println!("{} of ~{}", response.results.len(), response.estimated_total);
//! ```

pub mod config;
pub mod contracts;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod hll;
pub mod relevance;
pub mod scoring;
pub mod select;
pub mod store;
mod types;
mod utils;

pub mod testing;

// Re-exports for public API
pub use config::EngineConfig;
pub use corpus::{Corpus, CorpusDocument};
pub use engine::{SearchEngine, SearchRequest, SearchResponse};
pub use error::{Error, Result};
pub use hll::{assign, estimate_count, Precision, RegisterLookup};
pub use relevance::{Relevance, RelevanceMatch, TermQuery, TermRelevance};
pub use scoring::ranking::{compare_ranked, Scored};
pub use scoring::{ln_popularity, score, PolicyFactors, NOISE_FLOOR};
pub use select::{
    select_top_k, BoundedTopK, CancelFlag, PopularityScan, SelectRequest, Selection,
    SelectionStats,
};
pub use store::{
    DocumentStore, IngestReport, Rejected, Snapshot, UpdateOutcome, UpsertOutcome, UpsertRequest,
};
pub use types::{
    DocumentContent, DocumentId, HashSlot, Identity, Popularity, RankedDocument,
    RelevanceTokens, SearchDocument, SymbolEntry, MAX_DOCUMENT_ID_LEN,
};
pub use utils::normalize;
