// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Source ranking, filtering and per-domain deduplication
//!
//! Raw engine hits are scored against the query with cheap lexical signals
//! (title, snippet and URL matches), an authority bonus, a snippet-length
//! bonus and a recency bonus. Ordering is always descending by score with
//! ties kept in input order.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

use super::types::{RankedSource, SearchHit};

/// Reference, academic, government and major news sites
const AUTHORITATIVE_DOMAINS: &[&str] = &[
    "wikipedia.org",
    "britannica.com",
    ".edu",
    ".gov",
    "nih.gov",
    "cdc.gov",
    "nature.com",
    "sciencedirect.com",
    "arxiv.org",
    "scholar.google.com",
    "reuters.com",
    "bbc.com",
    "nytimes.com",
    "theguardian.com",
    "stackoverflow.com",
    "github.com",
    "mozilla.org",
    "w3.org",
];

/// Social platforms and generic Q&A aggregators
const LOW_QUALITY_PATTERNS: &[&str] = &[
    "pinterest.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "tiktok.com",
    "reddit.com",
    "quora.com",
    "answers.yahoo.com",
    "ask.com",
    "ehow.com",
];

/// Known paywalls
const BLOCKED_PATTERNS: &[&str] = &["medium.com/m/", "paywallz.com", "wsj.com", "ft.com"];

/// Snippets shorter than this are not worth ranking
const MIN_SNIPPET_CHARS: usize = 50;

/// Ranks, filters and deduplicates raw search hits
#[derive(Debug, Clone)]
pub struct SourceRanker {
    max_per_domain: usize,
}

impl Default for SourceRanker {
    fn default() -> Self {
        Self { max_per_domain: 2 }
    }
}

impl SourceRanker {
    pub fn new(max_per_domain: usize) -> Self {
        Self {
            max_per_domain: max_per_domain.max(1),
        }
    }

    pub fn max_per_domain(&self) -> usize {
        self.max_per_domain
    }

    /// Relevance of `hit` to `query`, judged against the current time
    pub fn score(&self, hit: &SearchHit, query: &str) -> f64 {
        self.score_at(hit, query, Utc::now())
    }

    /// Relevance of `hit` to `query`, judged against `now`
    pub fn score_at(&self, hit: &SearchHit, query: &str, now: DateTime<Utc>) -> f64 {
        let title = hit.title.to_lowercase();
        let content = hit.snippet.to_lowercase();
        let url = hit.url.to_lowercase();
        let phrase = query.trim().to_lowercase();
        let words = query_words(query);

        let mut score = 0.0;

        if !phrase.is_empty() && title.contains(&phrase) {
            score += 10.0;
        } else {
            score += 2.0 * words.iter().filter(|w| title.contains(w.as_str())).count() as f64;
        }

        if !phrase.is_empty() && content.contains(&phrase) {
            score += 5.0;
        } else {
            score += words.iter().filter(|w| content.contains(w.as_str())).count() as f64;
        }

        score += 0.5 * words.iter().filter(|w| url.contains(w.as_str())).count() as f64;

        if is_authoritative(&hit.url) {
            score += 15.0;
        }

        let length = content.chars().count();
        if length > 100 && length < 5000 {
            score += 3.0;
        } else if length >= 5000 {
            score += 1.0;
        }

        if let Some(published) = hit.published_at() {
            let days = (now - published).num_seconds() as f64 / 86_400.0;
            if days < 30.0 {
                score += 5.0;
            } else if days < 365.0 {
                score += 2.0;
            }
        }

        score
    }

    /// Drop blocked, low-quality and content-poor hits, score the rest and
    /// return the best `2 * limit` so deduplication has room to work
    pub fn filter_and_rank(&self, hits: &[SearchHit], query: &str, limit: usize) -> Vec<RankedSource> {
        debug!("Ranking {} results", hits.len());
        let now = Utc::now();

        let mut ranked: Vec<RankedSource> = hits
            .iter()
            .filter(|hit| {
                if is_blocked(&hit.url) {
                    debug!("Blocked: {}", hit.url);
                    return false;
                }
                if is_low_quality(&hit.url) {
                    debug!("Low quality filtered: {}", hit.url);
                    return false;
                }
                if hit.snippet.trim().chars().count() < MIN_SNIPPET_CHARS {
                    debug!("Insufficient content: {}", hit.url);
                    return false;
                }
                true
            })
            .map(|hit| RankedSource {
                relevance_score: self.score_at(hit, query, now),
                hit: hit.clone(),
            })
            .collect();

        // sort_by is stable: equal scores keep input order
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        for (i, source) in ranked.iter().take(5).enumerate() {
            debug!(
                "  {}. [Score: {}] {} - {}",
                i + 1,
                source.relevance_score,
                display_title(&source.hit.title),
                source.hit.url
            );
        }

        ranked.truncate(limit.saturating_mul(2));
        ranked
    }

    /// Keep at most `max_per_domain` sources per hostname, in order
    ///
    /// Sources whose URL has no parsable host are dropped.
    pub fn deduplicate(sources: Vec<RankedSource>, max_per_domain: usize) -> Vec<RankedSource> {
        let mut domain_count: HashMap<String, usize> = HashMap::new();

        sources
            .into_iter()
            .filter(|source| {
                let Some(host) = hostname(&source.hit.url) else {
                    debug!("Skipping unparsable URL: {}", source.hit.url);
                    return false;
                };
                let count = domain_count.entry(host).or_insert(0);
                if *count >= max_per_domain {
                    debug!("Skipping duplicate domain: {}", source.hit.url);
                    return false;
                }
                *count += 1;
                true
            })
            .collect()
    }

    /// Rank, filter, deduplicate and truncate to `limit`
    pub fn process_search_results(&self, hits: &[SearchHit], query: &str, limit: usize) -> Vec<RankedSource> {
        let ranked = self.filter_and_rank(hits, query, limit);
        let mut sources = Self::deduplicate(ranked, self.max_per_domain);
        sources.truncate(limit);

        info!("Selected {} of {} sources", sources.len(), hits.len());
        sources
    }
}

/// Distinct lowercase query words longer than two characters
pub fn query_words(query: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in query.to_lowercase().split_whitespace() {
        if word.chars().count() > 2 && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

pub fn is_blocked(url: &str) -> bool {
    let url = url.to_lowercase();
    BLOCKED_PATTERNS.iter().any(|p| url.contains(p))
}

pub fn is_low_quality(url: &str) -> bool {
    let url = url.to_lowercase();
    LOW_QUALITY_PATTERNS.iter().any(|p| url.contains(p))
}

/// Host-suffix match against the authority list
///
/// `.edu`-style entries match any host with that suffix; named domains match
/// themselves and their subdomains. Unparsable URLs fall back to substring.
pub fn is_authoritative(url: &str) -> bool {
    match hostname(url) {
        Some(host) => AUTHORITATIVE_DOMAINS.iter().any(|domain| {
            if domain.starts_with('.') {
                host.ends_with(domain)
            } else {
                host == *domain || host.ends_with(&format!(".{}", domain))
            }
        }),
        None => {
            let url = url.to_lowercase();
            AUTHORITATIVE_DOMAINS.iter().any(|d| url.contains(d))
        }
    }
}

fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

fn display_title(title: &str) -> &str {
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}
