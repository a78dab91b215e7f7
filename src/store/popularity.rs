// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Incremental popularity updates from the reference-graph feed.
//!
//! The feed is at-least-once and unordered, so every update carries the time
//! it was observed and the newest observation wins. Applying the same update
//! twice is a no-op. Nothing here ever touches the identity table.
//!
//! An update can also arrive before the document's first upsert. The newest
//! such observation is held and becomes the document's popularity when it is
//! created, instead of the seed count from the indexing pipeline.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use super::snapshot::Snapshot;
use super::DocumentStore;
use crate::contracts;
use crate::types::{DocumentId, Popularity};

/// Result of one popularity update. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The count (and its log) changed, along with every symbol entry.
    Applied,
    /// A newer observation is already stored.
    Stale,
    /// No live document with this id yet. The update is held until it is
    /// created (or superseded by a newer one).
    UnknownDocument,
}

impl Snapshot {
    pub(super) fn apply_popularity(&mut self, id: &DocumentId, popularity: Popularity) -> UpdateOutcome {
        let Some(doc) = self.documents.get_mut(id) else {
            let newest = self
                .pending
                .get(id)
                .map_or(true, |held| popularity.observed_at() >= held.observed_at());
            if newest {
                self.pending.insert(id.clone(), popularity);
            }
            return UpdateOutcome::UnknownDocument;
        };
        let previous = doc.popularity();
        if popularity.observed_at() < previous.observed_at() {
            return UpdateOutcome::Stale;
        }

        contracts::check_popularity_consistent(popularity);
        doc.set_popularity(popularity);

        if previous.count() != popularity.count() {
            self.by_popularity
                .remove(&(Reverse(previous.count()), id.clone()));
            self.by_popularity
                .insert((Reverse(popularity.count()), id.clone()));
        }

        if let Some(entries) = self.symbols.get_mut(id) {
            for entry in entries {
                entry.set_popularity(popularity);
            }
        }
        UpdateOutcome::Applied
    }
}

impl DocumentStore {
    /// `onReferenceGraphChange`: overwrite a document's popularity, stamped now.
    pub fn on_reference_graph_change(&self, id: &DocumentId, count: u64) -> UpdateOutcome {
        self.on_reference_graph_change_at(id, count, Utc::now())
    }

    /// Same as [`on_reference_graph_change`](Self::on_reference_graph_change),
    /// with the feed's own observation time for last-writer-wins.
    pub fn on_reference_graph_change_at(
        &self,
        id: &DocumentId,
        count: u64,
        observed_at: DateTime<Utc>,
    ) -> UpdateOutcome {
        let popularity = Popularity::new(count, observed_at);
        let outcome = self.write(|snapshot| snapshot.apply_popularity(id, popularity));
        tracing::debug!(%id, count, ?outcome, "popularity update");
        outcome
    }
}
