// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Point-in-time view of the corpus, plus the two indexes the query path needs.
//!
//! ```text
//! identities    DocumentId → Identity               insert-only
//! documents     DocumentId → SearchDocument         one live doc per id
//! symbols       DocumentId → [SymbolEntry]          share the package's popularity
//! pending       DocumentId → Popularity             feed updates that beat the first upsert
//!
//! by_popularity (Reverse(count), DocumentId)        feeds the top-K selector
//! by_register   register → (Reverse(rank), DocumentId)  feeds the estimator
//! ```
//!
//! Popularity is indexed by the integer count, not the float `ln`: `ln(e + c)`
//! is strictly increasing in `c`, so the order is the same and the key stays
//! totally ordered without float tricks.
//!
//! Every collection is a persistent `imbl` structure. Cloning a snapshot is
//! O(1), and a write only copies the nodes on the path to what it changes.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use imbl::{HashMap, OrdMap, OrdSet};

use crate::hll::{assign_identity, Precision, RegisterLookup, RegisterMaxima};
use crate::select::PopularityScan;
use crate::types::{
    DocumentContent, DocumentId, Identity, Popularity, SearchDocument, SymbolEntry,
};

use super::UpsertOutcome;

/// Immutable once published. Writers build the next version through the store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub(super) precision: Precision,
    pub(super) identities: HashMap<DocumentId, Identity>,
    pub(super) documents: HashMap<DocumentId, SearchDocument>,
    pub(super) symbols: HashMap<DocumentId, Vec<SymbolEntry>>,
    pub(super) pending: HashMap<DocumentId, Popularity>,
    pub(super) by_popularity: OrdSet<(Reverse<u64>, DocumentId)>,
    pub(super) by_register: OrdMap<u32, OrdSet<(Reverse<u8>, DocumentId)>>,
}

impl Snapshot {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            identities: HashMap::new(),
            documents: HashMap::new(),
            symbols: HashMap::new(),
            pending: HashMap::new(),
            by_popularity: OrdSet::new(),
            by_register: OrdMap::new(),
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&SearchDocument> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// The identity ever assigned to `id`, live or taken down.
    pub fn identity(&self, id: &DocumentId) -> Option<&Identity> {
        self.identities.get(id)
    }

    /// Exported-symbol entries of a package. Empty for unknown ids.
    pub fn symbols(&self, id: &DocumentId) -> &[SymbolEntry] {
        self.symbols.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every live document, in no particular order.
    pub fn documents(&self) -> impl Iterator<Item = &SearchDocument> + '_ {
        self.documents.values()
    }

    /// Number of registers with at least one live document.
    pub fn occupied_registers(&self) -> usize {
        self.by_register.len()
    }

    /// Smallest and largest popularity count, if the corpus isn't empty.
    pub fn popularity_range(&self) -> Option<(u64, u64)> {
        let max = self.by_popularity.get_min()?.0 .0;
        let min = self.by_popularity.get_max()?.0 .0;
        Some((min, max))
    }

    /// Feed updates held for ids with no live document.
    pub fn pending_updates(&self) -> usize {
        self.pending.len()
    }

    /// The stored identity for `id`, assigning a slot the first time it's seen.
    fn identity_for(&mut self, id: DocumentId) -> Identity {
        if let Some(identity) = self.identities.get(&id) {
            return identity.clone();
        }
        let identity = assign_identity(id.clone(), self.precision);
        self.identities.insert(id, identity.clone());
        identity
    }

    /// Create or update one document.
    ///
    /// A new document gets its identity and an initial popularity: the newest
    /// feed update held for it, or the seed count otherwise. An existing one
    /// only has its content and symbols replaced, and only when
    /// `content.commit_time` isn't older than what's stored.
    pub(super) fn upsert(
        &mut self,
        id: DocumentId,
        content: DocumentContent,
        popularity: u64,
        symbols: Vec<String>,
    ) -> UpsertOutcome {
        if let Some(doc) = self.documents.get_mut(&id) {
            if content.commit_time < doc.commit_time() {
                return UpsertOutcome::Stale;
            }
            doc.replace_content(content);
            let popularity = doc.popularity();
            self.symbols.insert(id.clone(), symbol_entries(&id, symbols, popularity));
            return UpsertOutcome::Updated;
        }

        let identity = self.identity_for(id.clone());
        let slot = identity.slot();
        // The seed count loses to any timed update from the reference-graph feed.
        let popularity = self
            .pending
            .remove(&id)
            .unwrap_or_else(|| Popularity::new(popularity, DateTime::<Utc>::MIN_UTC));
        let doc = SearchDocument::from_identity(identity, content, popularity);

        self.by_popularity
            .insert((Reverse(popularity.count()), id.clone()));
        let mut entries = self
            .by_register
            .get(&slot.register())
            .cloned()
            .unwrap_or_default();
        entries.insert((Reverse(slot.rank()), id.clone()));
        self.by_register.insert(slot.register(), entries);
        self.symbols
            .insert(id.clone(), symbol_entries(&id, symbols, popularity));
        self.documents.insert(id, doc);
        UpsertOutcome::Created
    }

    /// Take a document down, with its index entries and symbols.
    ///
    /// The identity stays: if the id comes back, it gets the same slot.
    pub(super) fn remove(&mut self, id: &DocumentId) -> bool {
        let Some(doc) = self.documents.remove(id) else {
            return false;
        };

        self.by_popularity
            .remove(&(Reverse(doc.popularity().count()), id.clone()));
        let slot = doc.slot();
        if let Some(entries) = self.by_register.get(&slot.register()) {
            let mut entries = entries.clone();
            entries.remove(&(Reverse(slot.rank()), id.clone()));
            if entries.is_empty() {
                self.by_register.remove(&slot.register());
            } else {
                self.by_register.insert(slot.register(), entries);
            }
        }
        self.symbols.remove(id);
        true
    }
}

fn symbol_entries(package: &DocumentId, names: Vec<String>, popularity: Popularity) -> Vec<SymbolEntry> {
    names
        .into_iter()
        .map(|name| SymbolEntry::new(package.clone(), name, popularity))
        .collect()
}

impl PopularityScan for Snapshot {
    fn scan_by_popularity(&self) -> Box<dyn Iterator<Item = &SearchDocument> + '_> {
        Box::new(
            self.by_popularity
                .iter()
                .filter_map(move |(_, id)| self.documents.get(id)),
        )
    }
}

impl RegisterLookup for Snapshot {
    /// Walks each occupied register from its highest rank down and stops at
    /// the first matching document, so popular predicates touch roughly one
    /// document per register.
    fn register_maxima(
        &self,
        precision: Precision,
        predicate: &dyn Fn(&SearchDocument) -> bool,
    ) -> RegisterMaxima {
        let mut maxima = RegisterMaxima::empty(precision);
        if precision != self.precision {
            // Slots were assigned at a different precision; nothing to look up.
            tracing::warn!(
                requested = precision.bits(),
                stored = self.precision.bits(),
                "register lookup at mismatched precision"
            );
            return maxima;
        }

        for (&register, entries) in self.by_register.iter() {
            let first_match = entries.iter().find_map(|(Reverse(rank), id)| {
                self.documents
                    .get(id)
                    .filter(|doc| predicate(doc))
                    .map(|_| *rank)
            });
            if let Some(rank) = first_match {
                maxima.set(register, rank);
            }
        }
        maxima
    }
}
