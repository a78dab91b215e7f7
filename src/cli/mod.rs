// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the pkgrank command-line interface.
//!
//! Three subcommands over a JSON corpus file: `search` for a ranked page,
//! `estimate` for just the approximate match count, and `inspect` for a look
//! at the corpus and its register occupancy.

pub mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pkgrank",
    about = "Popularity-ranked package search with approximate result counts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the documents and settings come from.
#[derive(Args)]
pub struct CorpusArgs {
    /// Corpus file: {"documents": [{"id", "text", "popularity", ...}]}
    #[arg(short, long)]
    pub corpus: PathBuf,

    /// Engine config (JSON). Flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank the documents matching a query
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Query text
        #[arg(short, long)]
        query: String,

        /// Page size (default from config, 10 otherwise)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Results to skip before the page starts
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Score multiplier for non-redistributable packages, in (0, 1]
        #[arg(long)]
        redist_factor: Option<f64>,

        /// Score multiplier for packages without a dependency manifest, in (0, 1]
        #[arg(long)]
        manifest_factor: Option<f64>,

        /// Print the response as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Estimate how many documents match a query
    Estimate {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Query text
        #[arg(short, long)]
        query: String,
    },

    /// Summarize a corpus: documents, registers, popularity range
    Inspect {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}
