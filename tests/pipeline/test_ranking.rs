// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Ranking, filtering and per-domain deduplication of raw search hits

use super::support::hit;
use atlas_rag::search::ranker::{is_authoritative, is_blocked, is_low_quality};
use atlas_rag::search::SourceRanker;

const SNIPPET: &str = "Photosynthesis converts light energy into chemical energy stored in glucose molecules.";

#[test]
fn test_filters_blocked_low_quality_and_thin_hits() {
    let hits = vec![
        hit("Photosynthesis pins", "https://www.pinterest.com/pin/123", SNIPPET),
        hit("Photosynthesis explained", "https://www.wsj.com/science/photo", SNIPPET),
        hit("Photosynthesis", "https://blog.example.com/short", "Too short."),
        hit("Photosynthesis basics", "https://biology.example.org/basics", SNIPPET),
    ];

    let ranker = SourceRanker::new(2);
    let sources = ranker.process_search_results(&hits, "photosynthesis", 5);

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].hit.url, "https://biology.example.org/basics");
}

#[test]
fn test_authoritative_source_ranks_first() {
    let hits = vec![
        hit("Photosynthesis notes", "https://notes.example.com/photo", SNIPPET),
        hit("Photosynthesis - Wikipedia", "https://en.wikipedia.org/wiki/Photosynthesis", SNIPPET),
        hit("Plant energy", "https://garden.example.net/energy", SNIPPET),
    ];

    let ranker = SourceRanker::new(2);
    let sources = ranker.process_search_results(&hits, "photosynthesis", 5);

    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].hit.url, "https://en.wikipedia.org/wiki/Photosynthesis");
    assert!(sources
        .windows(2)
        .all(|pair| pair[0].relevance_score >= pair[1].relevance_score));
}

#[test]
fn test_domain_cap_and_limit() {
    let hits: Vec<_> = (0..4)
        .map(|i| {
            hit(
                "Photosynthesis chapter",
                &format!("https://textbook.example.com/ch{}", i),
                SNIPPET,
            )
        })
        .chain((0..4).map(|i| {
            hit(
                "Photosynthesis lecture",
                &format!("https://lectures{}.example.edu/photo", i),
                SNIPPET,
            )
        }))
        .collect();

    let ranker = SourceRanker::new(2);
    let sources = ranker.process_search_results(&hits, "photosynthesis", 5);

    assert_eq!(sources.len(), 5);
    let textbook = sources
        .iter()
        .filter(|s| s.hit.url.contains("textbook.example.com"))
        .count();
    assert!(textbook <= 2);
}

#[test]
fn test_equal_scores_keep_engine_order() {
    let hits = vec![
        hit("Photosynthesis", "https://a.example.com/x", SNIPPET),
        hit("Photosynthesis", "https://b.example.com/x", SNIPPET),
        hit("Photosynthesis", "https://c.example.com/x", SNIPPET),
    ];

    let sources = SourceRanker::new(2).process_search_results(&hits, "photosynthesis", 5);
    let urls: Vec<_> = sources.iter().map(|s| s.hit.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://a.example.com/x", "https://b.example.com/x", "https://c.example.com/x"]
    );
}

#[test]
fn test_url_classification() {
    assert!(is_blocked("https://www.ft.com/content/abc"));
    assert!(is_low_quality("https://www.reddit.com/r/biology"));
    assert!(is_authoritative("https://www.cdc.gov/diabetes"));
    assert!(is_authoritative("https://cs.stanford.edu/notes"));
    assert!(!is_authoritative("https://notwikipedia.org.example.com"));
}

#[test]
fn test_five_hits_with_shared_domain_and_paywall() {
    let hits = vec![
        hit("Photosynthesis overview", "https://plants.example.com/overview", SNIPPET),
        hit("Photosynthesis stages", "https://plants.example.com/stages", SNIPPET),
        hit("Photosynthesis research", "https://www.ft.com/content/photosynthesis", SNIPPET),
        hit("Photosynthesis - Britannica", "https://www.britannica.com/science/photosynthesis", SNIPPET),
        hit("Photosynthesis for kids", "https://kids.example.org/photo", SNIPPET),
    ];

    let sources = SourceRanker::new(2).process_search_results(&hits, "photosynthesis", 5);

    assert_eq!(sources.len(), 4);
    assert!(sources.iter().all(|s| !is_blocked(&s.hit.url)));
    assert_eq!(sources[0].hit.url, "https://www.britannica.com/science/photosynthesis");
    let shared = sources
        .iter()
        .filter(|s| s.hit.url.starts_with("https://plants.example.com"))
        .count();
    assert_eq!(shared, 2);
}
