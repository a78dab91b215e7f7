// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! JSON corpus files, as read by the `pkgrank` binary.
//!
//! ```json
//! {
//!   "documents": [
//!     {
//!       "id": "golang.org/x/net/http2",
//!       "text": "HTTP/2 client and server",
//!       "popularity": 48213,
//!       "redistributable": true,
//!       "hasDependencyManifest": true,
//!       "commitTime": "2024-03-01T12:00:00Z",
//!       "symbols": ["Transport", "Server"]
//!     }
//!   ]
//! }
//! ```
//!
//! Ids are left unvalidated here; the store rejects bad ones per document.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::relevance::Relevance;
use crate::store::UpsertRequest;

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusDocument {
    pub id: String,
    /// Searchable text, tokenized by the engine's relevance scorer.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub popularity: u64,
    #[serde(default = "yes")]
    pub redistributable: bool,
    #[serde(default = "yes")]
    pub has_dependency_manifest: bool,
    #[serde(default)]
    pub commit_time: DateTime<Utc>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub documents: Vec<CorpusDocument>,
}

impl Corpus {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Tokenize every document (in parallel) into store requests.
    #[cfg(feature = "parallel")]
    pub fn into_requests<R: Relevance>(self, relevance: &R) -> Vec<UpsertRequest> {
        self.documents
            .into_par_iter()
            .map(|doc| to_request(doc, relevance))
            .collect()
    }

    /// Tokenize every document into store requests.
    #[cfg(not(feature = "parallel"))]
    pub fn into_requests<R: Relevance>(self, relevance: &R) -> Vec<UpsertRequest> {
        self.documents
            .into_iter()
            .map(|doc| to_request(doc, relevance))
            .collect()
    }
}

fn to_request<R: Relevance>(doc: CorpusDocument, relevance: &R) -> UpsertRequest {
    UpsertRequest {
        tokens: relevance.tokenize(&doc.text),
        id: doc.id,
        popularity: doc.popularity,
        redistributable: doc.redistributable,
        has_dependency_manifest: doc.has_dependency_manifest,
        commit_time: doc.commit_time,
        symbols: doc.symbols,
    }
}
