// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of the ranking engine.
//!
//! A search document is split in three on purpose:
//!
//! | Part              | Mutated by                  | Holds                              |
//! |-------------------|-----------------------------|------------------------------------|
//! | `Identity`        | nobody, ever                | `DocumentId` + HyperLogLog slot    |
//! | `DocumentContent` | upsert (new version)        | relevance tokens, policy flags     |
//! | `Popularity`      | the reference-graph feed    | referrer count + its log           |
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Identity**: the `HashSlot` is a pure function of the id and is assigned
//!   exactly once, when the document is first created. Recomputing it on update
//!   would shift the document between registers and corrupt every estimate that
//!   spans its history. `Identity` has private fields and no setters.
//!
//! - **Popularity**: `ln == ln(e + count)`. The only constructor derives `ln`
//!   from `count`, so the two can't drift apart.
//!
//! - **One live document per id**: upserts replace content in place, they never
//!   accumulate versions.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hll::{assign, Precision};
use crate::scoring::ln_popularity;

// =============================================================================
// IDENTITY
// =============================================================================

/// Longest accepted document id, in bytes.
pub const MAX_DOCUMENT_ID_LEN: usize = 1024;

/// Stable identity of a package, e.g. `golang.org/x/tools/go/packages`.
///
/// Validated on construction. Ordering is plain byte order, which is what the
/// final ranking tie-break uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Validate and wrap a package path.
    ///
    /// Rejects empty ids, ids longer than [`MAX_DOCUMENT_ID_LEN`], whitespace or
    /// control characters, leading/trailing slashes and empty path elements.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let reason = if raw.is_empty() {
            Some("empty")
        } else if raw.len() > MAX_DOCUMENT_ID_LEN {
            Some("too long")
        } else if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("contains whitespace or control characters")
        } else if raw.starts_with('/') || raw.ends_with('/') {
            Some("leading or trailing slash")
        } else if raw.contains("//") {
            Some("empty path element")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidDocumentId { id: raw, reason }),
            None => Ok(Self(raw)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

/// A document's HyperLogLog contribution: which register it lands in, and the
/// rank it offers that register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HashSlot {
    register: u32,
    rank: u8,
}

impl HashSlot {
    pub(crate) fn new(register: u32, rank: u8) -> Self {
        Self { register, rank }
    }

    #[inline]
    pub fn register(self) -> u32 {
        self.register
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }
}

/// The immutable half of a document.
///
/// Built only by [`assign::assign_identity`]; there is no way to change the slot
/// of an existing identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: DocumentId,
    slot: HashSlot,
}

impl Identity {
    pub(crate) fn new(id: DocumentId, slot: HashSlot) -> Self {
        Self { id, slot }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn slot(&self) -> HashSlot {
        self.slot
    }
}

// =============================================================================
// MUTABLE PARTS
// =============================================================================

/// Opaque handle to the relevance collaborator's per-document index state.
///
/// The engine never looks inside; it only hands the tokens back to whatever
/// [`Relevance`](crate::Relevance) implementation produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceTokens(Arc<[String]>);

impl RelevanceTokens {
    pub fn from_terms(terms: Vec<String>) -> Self {
        Self(terms.into())
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fields replaced wholesale when a newer version of the package is indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContent {
    pub tokens: RelevanceTokens,
    pub redistributable: bool,
    pub has_dependency_manifest: bool,
    /// Commit time of the indexed version. Ranking tie-break, and the
    /// last-writer-wins stamp for content upserts.
    pub commit_time: DateTime<Utc>,
}

/// Referrer count plus its natural-log dampening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popularity {
    count: u64,
    ln: f64,
    observed_at: DateTime<Utc>,
}

impl Popularity {
    /// The only way to build a `Popularity`: `ln` is always derived from `count`.
    pub fn new(count: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            count,
            ln: ln_popularity(count),
            observed_at,
        }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// `ln(e + count)`. Never below 1.
    #[inline]
    pub fn ln(&self) -> f64 {
        self.ln
    }

    /// Timestamp carried by the update that produced this value.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// One searchable package: the latest indexed version of a package path.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    identity: Identity,
    content: DocumentContent,
    popularity: Popularity,
}

impl SearchDocument {
    /// Create a standalone document, assigning its hash slot.
    ///
    /// Stores keep their own identity table and go through
    /// [`SearchDocument::from_identity`] instead, so the slot is assigned once
    /// per id no matter how many times the document is rebuilt.
    pub fn new(
        id: DocumentId,
        content: DocumentContent,
        popularity: Popularity,
        precision: Precision,
    ) -> Self {
        Self::from_identity(assign::assign_identity(id, precision), content, popularity)
    }

    pub(crate) fn from_identity(
        identity: Identity,
        content: DocumentContent,
        popularity: Popularity,
    ) -> Self {
        Self {
            identity,
            content,
            popularity,
        }
    }

    pub fn id(&self) -> &DocumentId {
        self.identity.id()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn slot(&self) -> HashSlot {
        self.identity.slot()
    }

    pub fn content(&self) -> &DocumentContent {
        &self.content
    }

    pub fn tokens(&self) -> &RelevanceTokens {
        &self.content.tokens
    }

    pub fn popularity(&self) -> Popularity {
        self.popularity
    }

    #[inline]
    pub fn ln_popularity(&self) -> f64 {
        self.popularity.ln()
    }

    #[inline]
    pub fn redistributable(&self) -> bool {
        self.content.redistributable
    }

    #[inline]
    pub fn has_dependency_manifest(&self) -> bool {
        self.content.has_dependency_manifest
    }

    #[inline]
    pub fn commit_time(&self) -> DateTime<Utc> {
        self.content.commit_time
    }

    /// New version arrived: content changes, identity and popularity don't.
    pub(crate) fn replace_content(&mut self, content: DocumentContent) {
        self.content = content;
    }

    /// Reference graph changed: popularity changes, nothing else does.
    pub(crate) fn set_popularity(&mut self, popularity: Popularity) {
        self.popularity = popularity;
    }
}

/// Search entry for one exported symbol of a package.
///
/// Logically a separate record, but it shares the package's popularity so that
/// every view of one package ranks consistently.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub package: DocumentId,
    pub name: String,
    popularity: Popularity,
}

impl SymbolEntry {
    pub(crate) fn new(package: DocumentId, name: String, popularity: Popularity) -> Self {
        Self {
            package,
            name,
            popularity,
        }
    }

    pub fn popularity(&self) -> Popularity {
        self.popularity
    }

    pub(crate) fn set_popularity(&mut self, popularity: Popularity) {
        self.popularity = popularity;
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One entry of a ranked result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDocument {
    pub id: DocumentId,
    pub score: f64,
    pub commit_time: DateTime<Utc>,
}
