// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Bounded-concurrency scraping against a fake web

use super::support::{article, FakeWeb};
use atlas_rag::cache::CacheManager;
use atlas_rag::content::{ScrapeConfig, ScrapeError, Scraper};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const BODY: &str = "Tokio is an asynchronous runtime for the Rust programming language. \
It provides the building blocks needed for writing network applications, including \
a multi-threaded scheduler, timers, and asynchronous versions of standard library I/O types.";

fn config() -> ScrapeConfig {
    ScrapeConfig {
        backoff_base_ms: 1,
        backoff_cap_ms: 2,
        ..ScrapeConfig::default()
    }
}

#[tokio::test]
async fn test_batch_respects_concurrency_limit() {
    let urls: Vec<String> = (0..6).map(|i| format!("https://site{}.example.com/page", i)).collect();
    let web = urls
        .iter()
        .fold(FakeWeb::new(Duration::from_millis(40)), |web, url| {
            web.page(url, 200, article(BODY))
        });
    let web = Arc::new(web);
    let scraper = Scraper::with_transport(web.clone(), Arc::new(CacheManager::disabled()), config());

    let outcomes = scraper.scrape_batch(&urls, 2).await;

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(web.peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let urls = vec![
        "https://good.example.com/a".to_string(),
        "https://paywall.example.com/b".to_string(),
        "http://127.0.0.1/admin".to_string(),
        "https://gone.example.com/c".to_string(),
    ];
    let web = Arc::new(
        FakeWeb::new(Duration::from_millis(1))
            .page("https://good.example.com/a", 200, article(BODY))
            .page("https://paywall.example.com/b", 403, String::new()),
    );
    let scraper = Scraper::with_transport(web.clone(), Arc::new(CacheManager::disabled()), config());

    let outcomes = scraper.scrape_batch(&urls, 5).await;

    let order: Vec<_> = outcomes.iter().map(|o| o.url.as_str()).collect();
    assert_eq!(order, urls.iter().map(String::as_str).collect::<Vec<_>>());

    assert!(outcomes[0].success);
    assert!(outcomes[0].content.as_deref().unwrap().contains("asynchronous runtime"));
    assert!(!outcomes[0].content.as_deref().unwrap().contains("Home | About"));

    assert!(matches!(outcomes[1].error_kind, Some(ScrapeError::Blocked { status: 403, .. })));
    assert!(matches!(outcomes[2].error_kind, Some(ScrapeError::UnsafeUrl(_))));
    assert!(matches!(outcomes[3].error_kind, Some(ScrapeError::HttpStatus { status: 404, .. })));

    // One request each for the good, blocked and missing pages; none for the loopback URL
    assert_eq!(web.requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_successful_scrape_is_cached() {
    let url = "https://cached.example.com/page";
    let web = Arc::new(FakeWeb::new(Duration::from_millis(1)).page(url, 200, article(BODY)));
    let cache = Arc::new(CacheManager::new(&Default::default()));
    let scraper = Scraper::with_transport(web.clone(), cache.clone(), config());

    let first = scraper.scrape_with_retry(url, 2).await.unwrap();
    let second = scraper.scrape_with_retry(url, 2).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(web.requests.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats().scrape.hits, 1);
}
