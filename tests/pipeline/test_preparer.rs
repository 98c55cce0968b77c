// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Source preparation: snippet reuse, capped scraping and ordering

use super::support::{article, hit, FakeWeb};
use atlas_rag::cache::CacheManager;
use atlas_rag::content::{ScrapeConfig, Scraper};
use atlas_rag::rag::{PrepareConfig, SourceOrigin, SourcePreparer};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const GOOD_SNIPPET: &str = "Rust ownership rules: each value has a single owner, and the value is dropped when the owner goes out of scope.";
const BOILERPLATE: &str = "Cookie policy. Privacy policy. Terms of service. Sign up for our newsletter.";
const PAGE: &str = "Ownership is the set of rules that govern how a Rust program manages memory. \
Some languages have garbage collection, others require explicit allocation. Rust checks \
ownership at compile time, so none of these features slow the program down while it runs.";

fn preparer(web: Arc<FakeWeb>, config: PrepareConfig) -> SourcePreparer {
    let scraper = Scraper::with_transport(
        web,
        Arc::new(CacheManager::disabled()),
        ScrapeConfig {
            backoff_base_ms: 1,
            backoff_cap_ms: 1,
            ..ScrapeConfig::default()
        },
    );
    SourcePreparer::new(config, Arc::new(scraper))
}

#[tokio::test]
async fn test_snippets_reused_and_scrapes_capped() {
    let hits = vec![
        hit("Rust ownership explained", "https://docs.example.com/ownership", GOOD_SNIPPET),
        hit("Rust ownership guide", "https://a.example.com/guide", BOILERPLATE),
        hit("Rust ownership guide", "https://b.example.com/guide", BOILERPLATE),
        hit("Rust ownership guide", "https://c.example.com/guide", BOILERPLATE),
    ];
    let web = Arc::new(
        FakeWeb::new(Duration::from_millis(1))
            .page("https://a.example.com/guide", 200, article(PAGE))
            .page("https://b.example.com/guide", 200, article(PAGE))
            .page("https://c.example.com/guide", 200, article(PAGE)),
    );
    let preparer = preparer(
        web.clone(),
        PrepareConfig {
            max_scrape_targets: 2,
            ..PrepareConfig::default()
        },
    );

    let sources = preparer.prepare_sources(&hits, "rust ownership").await;

    assert_eq!(web.requests.load(Ordering::SeqCst), 2);
    assert_eq!(sources.len(), 3);

    let snippet_sources: Vec<_> = sources
        .iter()
        .filter(|s| s.origin == SourceOrigin::SearchSnippet)
        .collect();
    assert_eq!(snippet_sources.len(), 1);
    assert_eq!(snippet_sources[0].url, "https://docs.example.com/ownership");

    let scraped: Vec<_> = sources.iter().filter(|s| s.origin == SourceOrigin::Scrape).collect();
    assert_eq!(scraped.len(), 2);
    assert!(scraped.iter().all(|s| s.content.contains("compile time")));
    assert!(!sources.iter().any(|s| s.url.contains("c.example.com")));

    assert!(sources
        .windows(2)
        .all(|pair| pair[0].relevance_score >= pair[1].relevance_score));
}

#[tokio::test]
async fn test_failed_scrapes_are_skipped() {
    let hits = vec![
        hit("Rust ownership guide", "https://paywall.example.com/guide", BOILERPLATE),
        hit("Rust ownership guide", "https://missing.example.com/guide", BOILERPLATE),
    ];
    let web = Arc::new(
        FakeWeb::new(Duration::from_millis(1)).page("https://paywall.example.com/guide", 403, String::new()),
    );
    let preparer = preparer(web, PrepareConfig::default());

    let sources = preparer.prepare_sources(&hits, "rust ownership").await;

    assert!(sources.is_empty());
}

#[tokio::test]
async fn test_content_truncated_to_limit() {
    let long_snippet = GOOD_SNIPPET.repeat(30);
    let hits = vec![hit("Rust ownership", "https://docs.example.com/long", &long_snippet)];
    let preparer = preparer(
        Arc::new(FakeWeb::new(Duration::from_millis(1))),
        PrepareConfig {
            max_content_length: 500,
            ..PrepareConfig::default()
        },
    );

    let sources = preparer.prepare_sources(&hits, "rust ownership").await;

    assert_eq!(sources.len(), 1);
    assert!(sources[0].content.len() <= 500);
    assert!(sources[0].content.contains("ownership"));
}
