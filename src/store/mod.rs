// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory document store with snapshot reads.
//!
//! # Concurrency
//!
//! ```text
//!   readers ──ArcSwap::load_full (atomic)──▶ Arc<Snapshot> ──▶ estimate / select
//!   writers ──writer mutex──▶ clone snapshot ──▶ mutate ──▶ ArcSwap::store
//! ```
//!
//! Readers never take a lock: they load the current `Arc` and compute on a
//! snapshot nobody can change under them. Writers are serialized by a mutex
//! and build the next snapshot from the current one. Every collection in a
//! [`Snapshot`] is a persistent `imbl` structure, so that clone is O(1) and a
//! one-document write copies only the O(log n) path it touches, whether or
//! not a reader still holds the old version. Races between writers to the
//! same document are settled by timestamps, not lock order.

mod popularity;
mod snapshot;

pub use popularity::UpdateOutcome;
pub use snapshot::Snapshot;

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::Result;
use crate::hll::Precision;
use crate::types::{DocumentContent, DocumentId, RelevanceTokens};

/// One document as delivered by the indexing pipeline.
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    /// Unvalidated package path.
    pub id: String,
    pub tokens: RelevanceTokens,
    /// Referrer count at index time. Only used when the document is new.
    pub popularity: u64,
    pub redistributable: bool,
    pub has_dependency_manifest: bool,
    pub commit_time: DateTime<Utc>,
    /// Names of the package's exported symbols.
    pub symbols: Vec<String>,
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting: identity assigned, document indexed.
    Created,
    /// Content replaced in place.
    Updated,
    /// Older than the stored version; nothing changed.
    Stale,
}

/// A batch entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub id: String,
    pub reason: String,
}

/// Per-batch ingest tally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub created: usize,
    pub updated: usize,
    pub stale: usize,
    pub rejected: Vec<Rejected>,
}

impl IngestReport {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Stale => self.stale += 1,
        }
    }
}

/// The corpus: identities, documents, symbol aggregates and their indexes.
#[derive(Debug)]
pub struct DocumentStore {
    current: ArcSwap<Snapshot>,
    writer: Mutex<()>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(Precision::default())
    }
}

impl DocumentStore {
    pub fn new(precision: Precision) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::new(precision)),
            writer: Mutex::new(()),
        }
    }

    /// Precision every slot in this store was assigned at.
    pub fn precision(&self) -> Precision {
        self.current.load().precision()
    }

    /// The current point-in-time view. One atomic load, never blocks.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// Run `mutate` against the next version of the snapshot and publish it.
    pub(crate) fn write<T>(&self, mutate: impl FnOnce(&mut Snapshot) -> T) -> T {
        let _writer = self.writer.lock();
        let mut next = Snapshot::clone(&self.current.load());
        let output = mutate(&mut next);
        self.current.store(Arc::new(next));
        output
    }

    /// Create or update one document.
    ///
    /// # Errors
    /// [`Error::InvalidDocumentId`](crate::Error::InvalidDocumentId) if the id
    /// fails validation. The store is unchanged in that case.
    pub fn upsert(&self, request: UpsertRequest) -> Result<UpsertOutcome> {
        let (id, content, popularity, symbols) = split_request(request)?;
        let outcome = self.write(|snapshot| snapshot.upsert(id.clone(), content, popularity, symbols));
        tracing::debug!(%id, ?outcome, "upsert");
        Ok(outcome)
    }

    /// Upsert many documents under one write.
    ///
    /// Malformed ids are rejected one by one and logged; the rest of the batch
    /// still goes in.
    pub fn ingest_batch<I>(&self, requests: I) -> IngestReport
    where
        I: IntoIterator<Item = UpsertRequest>,
    {
        let mut report = IngestReport::default();
        let mut valid = Vec::new();
        for request in requests {
            let raw = request.id.clone();
            match split_request(request) {
                Ok(parts) => valid.push(parts),
                Err(err) => {
                    tracing::warn!(id = %raw, error = %err, "rejected document");
                    report.rejected.push(Rejected {
                        id: raw,
                        reason: err.to_string(),
                    });
                }
            }
        }

        self.write(|snapshot| {
            for (id, content, popularity, symbols) in valid {
                report.record(snapshot.upsert(id, content, popularity, symbols));
            }
        });

        tracing::info!(
            created = report.created,
            updated = report.updated,
            stale = report.stale,
            rejected = report.rejected.len(),
            "ingested batch"
        );
        report
    }

    /// Takedown: drop the document and everything derived from it.
    pub fn remove(&self, id: &DocumentId) -> bool {
        let removed = self.write(|snapshot| snapshot.remove(id));
        if removed {
            tracing::debug!(%id, "removed document");
        }
        removed
    }
}

fn split_request(
    request: UpsertRequest,
) -> Result<(DocumentId, DocumentContent, u64, Vec<String>)> {
    let id = DocumentId::parse(request.id)?;
    let content = DocumentContent {
        tokens: request.tokens,
        redistributable: request.redistributable,
        has_dependency_manifest: request.has_dependency_manifest,
        commit_time: request.commit_time,
    };
    Ok((id, content, request.popularity, request.symbols))
}
