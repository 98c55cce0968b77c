// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Source preparation
//!
//! Ranks raw hits, reuses search snippets where they carry enough text and
//! scrapes only the remainder, capped at a small number of targets.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::PrepareConfig;
use super::types::{PreparedSource, SourceOrigin};
use crate::content::chunker::{clean_text, extract_smart_content};
use crate::content::scraper::Scraper;
use crate::search::ranker::SourceRanker;
use crate::search::types::{RankedSource, SearchHit};

/// Snippets must yield at least this many characters to skip scraping
pub const MIN_SNIPPET_CONTENT_CHARS: usize = 30;

/// Scraped pages must yield at least this many characters to be kept
pub const MIN_SCRAPED_CONTENT_CHARS: usize = 50;

/// Builds the ordered source list for answer generation
pub struct SourcePreparer {
    ranker: SourceRanker,
    scraper: Arc<Scraper>,
    config: PrepareConfig,
}

impl SourcePreparer {
    pub fn new(config: PrepareConfig, scraper: Arc<Scraper>) -> Self {
        Self {
            ranker: SourceRanker::new(config.max_per_domain),
            scraper,
            config,
        }
    }

    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Turn raw search hits into prepared sources, best first
    ///
    /// Per-URL failures are logged and skipped; an empty result is a valid
    /// outcome, not an error.
    pub async fn prepare_sources(&self, hits: &[SearchHit], query: &str) -> Vec<PreparedSource> {
        info!("Preparing sources from {} search results", hits.len());

        let ranked = self
            .ranker
            .process_search_results(hits, query, self.config.max_sources);
        if ranked.is_empty() {
            warn!("No valid sources after filtering for: {}", query);
            return Vec::new();
        }

        let mut sources = Vec::with_capacity(ranked.len());
        let mut to_scrape: Vec<&RankedSource> = Vec::new();

        for source in &ranked {
            if let Some(content) = self.condense(&source.hit.snippet, query, MIN_SNIPPET_CONTENT_CHARS) {
                debug!("Using search snippet for {} ({} chars)", source.hit.url, content.len());
                sources.push(PreparedSource::from_ranked(source, content, SourceOrigin::SearchSnippet));
            } else if to_scrape.len() < self.config.max_scrape_targets {
                debug!("Queueing scrape for {}", source.hit.url);
                to_scrape.push(source);
            } else {
                debug!("Scrape limit reached, dropping {}", source.hit.url);
            }
        }

        if !to_scrape.is_empty() {
            let urls: Vec<String> = to_scrape.iter().map(|s| s.hit.url.clone()).collect();
            let concurrency = self
                .scraper
                .config()
                .max_concurrent
                .min(self.config.max_scrape_targets);
            let outcomes = self.scraper.scrape_batch(&urls, concurrency).await;

            for (source, outcome) in to_scrape.into_iter().zip(outcomes) {
                let Some(page) = outcome.content.filter(|_| outcome.success) else {
                    info!(
                        "Skipping {}: {}",
                        outcome.url,
                        outcome.error.as_deref().unwrap_or("scrape failed")
                    );
                    continue;
                };
                match self.condense(&page, query, MIN_SCRAPED_CONTENT_CHARS) {
                    Some(content) => {
                        debug!("Using scraped content for {} ({} chars)", outcome.url, content.len());
                        sources.push(PreparedSource::from_ranked(source, content, SourceOrigin::Scrape));
                    }
                    None => warn!("Scraped content too short after extraction: {}", outcome.url),
                }
            }
        }

        if sources.is_empty() {
            warn!("No usable sources for: {}", query);
        }

        sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        info!("Prepared {} sources", sources.len());
        sources
    }

    /// Clean and condense text, or `None` if fewer than `min_chars` remain
    fn condense(&self, text: &str, query: &str, min_chars: usize) -> Option<String> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return None;
        }
        let content = extract_smart_content(&cleaned, query, self.config.max_content_length);
        (content.chars().count() >= min_chars).then_some(content)
    }
}
