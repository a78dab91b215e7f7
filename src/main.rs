// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pkgrank::{
    Corpus, EngineConfig, PolicyFactors, SearchEngine, SearchRequest, SearchResponse,
    TermRelevance,
};

mod cli;
use cli::display::{
    format_count, row, score_bar, section_bot, section_top, styled, total_label, BOLD, DIM,
};
use cli::{Cli, Commands, CorpusArgs};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            corpus,
            query,
            limit,
            offset,
            redist_factor,
            manifest_factor,
            json,
        } => {
            let (engine, config) = load(&corpus)?;
            let mut request = SearchRequest::new(query).offset(offset);
            if let Some(limit) = limit {
                request = request.limit(limit);
            }
            if redist_factor.is_some() || manifest_factor.is_some() {
                let factors = PolicyFactors::new(
                    redist_factor.unwrap_or(config.redistributable_factor),
                    manifest_factor.unwrap_or(config.manifest_factor),
                )
                .context("invalid penalty flag")?;
                request = request.factors(factors);
            }

            let started = Instant::now();
            let response = engine.search(&request)?;
            info!(elapsed_us = started.elapsed().as_micros() as u64, "search done");

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&request.query, &response);
            }
        }
        Commands::Estimate { corpus, query } => {
            let (engine, _) = load(&corpus)?;
            let estimate = engine.estimate(&query);
            let error = engine.precision().standard_error() * 100.0;
            println!(
                "{} documents match {:?} (±{:.2}% standard error)",
                format_count(estimate),
                query,
                error
            );
        }
        Commands::Inspect { corpus } => {
            let (engine, _) = load(&corpus)?;
            print_inspection(&engine);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for `--json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(args: &CorpusArgs) -> Result<(SearchEngine<TermRelevance>, EngineConfig)> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let engine = SearchEngine::new(TermRelevance, &config)?;
    let started = Instant::now();
    let corpus = Corpus::from_path(&args.corpus)
        .with_context(|| format!("loading corpus {}", args.corpus.display()))?;
    let report = engine
        .store()
        .ingest_batch(corpus.into_requests(engine.relevance()));

    info!(
        documents = engine.store().len(),
        rejected = report.rejected.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "corpus loaded"
    );
    Ok((engine, config))
}

fn print_response(query: &str, response: &SearchResponse) {
    section_top(&format!("{:?}", query));
    if response.results.is_empty() {
        row(&styled(&[DIM], " no results"));
    }
    let best = response.results.first().map_or(0.0, |r| r.score);
    for (i, result) in response.results.iter().enumerate() {
        row(&format!(
            " {:>3}. {} {:>7.3}  {}",
            i + 1,
            score_bar(result.score, best),
            result.score,
            styled(&[BOLD], result.id.as_str())
        ));
    }
    section_bot();
    println!(
        " {} shown, {} total",
        response.results.len(),
        total_label(response.estimated_total, response.exact)
    );
}

fn print_inspection(engine: &SearchEngine<TermRelevance>) {
    let snapshot = engine.store().snapshot();
    let precision = snapshot.precision();
    let registers = precision.registers();
    let occupied = snapshot.occupied_registers();

    section_top("CORPUS");
    row(&format!(" documents          {}", format_count(snapshot.len() as u64)));
    match snapshot.popularity_range() {
        Some((min, max)) => row(&format!(
            " popularity         {} .. {}",
            format_count(min),
            format_count(max)
        )),
        None => row(" popularity         -"),
    }
    section_top("HYPERLOGLOG");
    row(&format!(" precision          {} bits", precision.bits()));
    row(&format!(
        " registers          {} of {} occupied ({:.1}%)",
        format_count(occupied as u64),
        format_count(registers as u64),
        occupied as f64 * 100.0 / registers as f64
    ));
    row(&format!(
        " standard error     {:.2}%",
        precision.standard_error() * 100.0
    ));
    section_bot();
}
