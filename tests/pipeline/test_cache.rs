// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Cache reuse across repeated questions

use super::support::{hit, CannedModel, FakeWeb, StaticSearch};
use atlas_rag::ask::AskPipeline;
use atlas_rag::cache::{CacheConfig, CacheManager};
use atlas_rag::config::FeatureConfig;
use atlas_rag::content::{ScrapeConfig, Scraper};
use atlas_rag::rag::PrepareConfig;
use atlas_rag::search::{SearchConfig, SearchService};
use std::sync::Arc;
use std::time::Duration;

fn pipeline(cache: Arc<CacheManager>, search: Arc<StaticSearch>, model: Arc<CannedModel>) -> AskPipeline {
    let scraper = Arc::new(Scraper::with_transport(
        Arc::new(FakeWeb::new(Duration::from_millis(1))),
        cache.clone(),
        ScrapeConfig::default(),
    ));
    AskPipeline::with_components(
        SearchService::with_provider(search, cache.clone(), &SearchConfig::default()),
        scraper,
        model,
        cache,
        PrepareConfig::default(),
        &FeatureConfig::default(),
    )
}

fn search() -> Arc<StaticSearch> {
    Arc::new(StaticSearch::new(vec![hit(
        "Photosynthesis - Wikipedia",
        "https://en.wikipedia.org/wiki/Photosynthesis",
        "Photosynthesis is the process used by plants to convert light energy into chemical energy.",
    )]))
}

#[tokio::test]
async fn test_repeat_question_ignores_case() {
    let cache = Arc::new(CacheManager::new(&CacheConfig::default()));
    let search = search();
    let model = Arc::new(CannedModel::new("Plants turn light into sugar [1]."));
    let pipeline = pipeline(cache.clone(), search.clone(), model.clone());

    let first = pipeline.ask("s1", "What is photosynthesis?").await.unwrap();
    let second = pipeline.ask("s2", "  WHAT IS PHOTOSYNTHESIS? ").await.unwrap();

    assert_eq!(first.answer, second.answer);
    assert_eq!(search.queries().len(), 1);
    assert_eq!(model.answer_prompts().len(), 1);

    let stats = pipeline.cache_stats();
    assert_eq!(stats.search.hits, 1);
    assert!(stats.llm.hits >= 1);
}

#[tokio::test]
async fn test_disabled_cache_calls_through() {
    let search = search();
    let model = Arc::new(CannedModel::new("Plants turn light into sugar [1]."));
    let pipeline = pipeline(Arc::new(CacheManager::disabled()), search.clone(), model.clone());

    pipeline.ask("s1", "What is photosynthesis?").await.unwrap();
    pipeline.ask("s1", "What is photosynthesis?").await.unwrap();

    assert_eq!(search.queries().len(), 2);
    assert_eq!(model.answer_prompts().len(), 2);
    assert_eq!(pipeline.cache_stats().llm.hit_rate, None);
}
