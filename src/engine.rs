// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The query path: one snapshot, one selection, one estimate.
//!
//! ```text
//! SearchRequest ─▶ parse_query ─┬─▶ select_top_k ─▶ results
//!                               └─▶ estimate_count ─▶ estimated_total
//!                      (both over the same Arc<Snapshot>)
//! ```
//!
//! When the selector got to the end of the scan without pruning, it has
//! already evaluated every document, so its match count is the exact total
//! and the estimator isn't consulted at all. That count includes matches the
//! noise floor kept off the page.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::config::EngineConfig;
use crate::contracts;
use crate::error::Result;
use crate::hll::{estimate_count, Precision};
use crate::relevance::Relevance;
use crate::scoring::PolicyFactors;
use crate::select::{select_top_k, CancelFlag, PopularityScan, SelectRequest};
use crate::store::{DocumentStore, Snapshot};
use crate::types::RankedDocument;

/// One query.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Page size. `None` uses the configured default.
    pub limit: Option<usize>,
    pub offset: usize,
    /// Policy penalties. `None` uses the configured factors.
    pub factors: Option<PolicyFactors>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            offset: 0,
            factors: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn factors(mut self, factors: PolicyFactors) -> Self {
        self.factors = Some(factors);
        self
    }
}

/// A ranked page and the (approximate) number of matches overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<RankedDocument>,
    pub estimated_total: u64,
    /// Whether `estimated_total` is a count rather than an estimate.
    pub exact: bool,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            estimated_total: 0,
            exact: true,
        }
    }
}

/// Ranking engine over a [`DocumentStore`], generic over the relevance scorer.
pub struct SearchEngine<R> {
    relevance: R,
    store: Arc<DocumentStore>,
    factors: PolicyFactors,
    noise_floor: f64,
    default_limit: usize,
}

impl<R: Relevance> SearchEngine<R> {
    /// Engine with an empty store built from `config`.
    pub fn new(relevance: R, config: &EngineConfig) -> Result<Self> {
        let store = Arc::new(DocumentStore::new(config.precision()?));
        Self::with_store(relevance, store, config)
    }

    /// Engine over an existing store. The store's precision wins over the config's.
    pub fn with_store(relevance: R, store: Arc<DocumentStore>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            relevance,
            store,
            factors: config.factors()?,
            noise_floor: config.noise_floor,
            default_limit: config.default_limit,
        })
    }

    pub fn relevance(&self) -> &R {
        &self.relevance
    }

    /// Shared handle for ingest and popularity updates.
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn precision(&self) -> Precision {
        self.store.precision()
    }

    /// Top results plus a total-match estimate.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.search_inner(request, None)
    }

    /// [`search`](Self::search) that gives up when `cancel` is raised.
    pub fn search_with_cancel(&self, request: &SearchRequest, cancel: &CancelFlag) -> Result<SearchResponse> {
        self.search_inner(request, Some(cancel))
    }

    /// Approximate number of documents matching `query`. Zero if it doesn't parse.
    pub fn estimate(&self, query: &str) -> u64 {
        let Some(parsed) = self.relevance.parse_query(query) else {
            return 0;
        };
        let snapshot = self.store.snapshot();
        self.estimate_on(&snapshot, &parsed)
    }

    fn estimate_on(&self, snapshot: &Snapshot, query: &R::Query) -> u64 {
        estimate_count(snapshot, snapshot.precision(), &|doc| {
            self.relevance.matches(query, doc)
        })
    }

    #[instrument(level = "debug", skip_all, fields(query = %request.query, offset = request.offset))]
    fn search_inner(&self, request: &SearchRequest, cancel: Option<&CancelFlag>) -> Result<SearchResponse> {
        let Some(query) = self.relevance.parse_query(&request.query) else {
            tracing::debug!("empty or unparseable query");
            return Ok(SearchResponse::empty());
        };

        let limit = request.limit.unwrap_or(self.default_limit);
        let select = SelectRequest {
            limit,
            offset: request.offset,
            factors: request.factors.unwrap_or(self.factors),
            noise_floor: self.noise_floor,
        };

        let snapshot = self.store.snapshot();
        let selection = select_top_k(
            snapshot.scan_by_popularity(),
            |doc| self.relevance.evaluate(&query, doc),
            &select,
            cancel,
        )?;
        contracts::check_ranked_results(&selection.results, self.noise_floor);

        let (estimated_total, exact) = if selection.stats.exhausted {
            (selection.stats.matched as u64, true)
        } else {
            // A non-empty page proves everything ranked up to its end matched.
            // An empty one proves nothing.
            let proven = match selection.results.len() {
                0 => 0,
                len => request.offset.saturating_add(len) as u64,
            };
            (self.estimate_on(&snapshot, &query).max(proven), false)
        };

        tracing::debug!(
            returned = selection.results.len(),
            estimated_total,
            exact,
            scanned = selection.stats.scanned,
            "search finished"
        );

        Ok(SearchResponse {
            results: selection.results,
            estimated_total,
            exact,
        })
    }
}
