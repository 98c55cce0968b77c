// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// End-to-end question answering over fake search, web and model

use super::support::{hit, CannedModel, FakeWeb, StaticSearch};
use atlas_rag::ask::{AskError, AskPipeline};
use atlas_rag::cache::CacheManager;
use atlas_rag::config::FeatureConfig;
use atlas_rag::content::{ScrapeConfig, Scraper};
use atlas_rag::llm::StreamEvent;
use atlas_rag::rag::PrepareConfig;
use atlas_rag::search::{SearchConfig, SearchHit, SearchService};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

const ANSWER: &str = "Diabetes is a chronic condition affecting blood sugar [1].";

fn diabetes_hits() -> Vec<SearchHit> {
    vec![
        hit(
            "Diabetes - Wikipedia",
            "https://en.wikipedia.org/wiki/Diabetes",
            "Diabetes mellitus is a group of metabolic disorders characterized by high blood sugar levels over a prolonged period.",
        ),
        hit(
            "Diabetes basics",
            "https://health.example.com/diabetes",
            "Diabetes is a chronic health condition that affects how your body turns food into energy.",
        ),
    ]
}

struct Harness {
    pipeline: AskPipeline,
    search: Arc<StaticSearch>,
    model: Arc<CannedModel>,
    cache: Arc<CacheManager>,
}

fn harness(hits: Vec<SearchHit>, web: FakeWeb, model: CannedModel, features: FeatureConfig) -> Harness {
    let cache = Arc::new(CacheManager::new(&Default::default()));
    let search = Arc::new(StaticSearch::new(hits));
    let model = Arc::new(model);
    let scraper = Arc::new(Scraper::with_transport(
        Arc::new(web),
        cache.clone(),
        ScrapeConfig {
            backoff_base_ms: 1,
            backoff_cap_ms: 1,
            ..ScrapeConfig::default()
        },
    ));
    let pipeline = AskPipeline::with_components(
        SearchService::with_provider(search.clone(), cache.clone(), &SearchConfig::default()),
        scraper,
        model.clone(),
        cache.clone(),
        PrepareConfig::default(),
        &features,
    );
    Harness {
        pipeline,
        search,
        model,
        cache,
    }
}

fn no_web() -> FakeWeb {
    FakeWeb::new(Duration::from_millis(1))
}

#[tokio::test]
async fn test_ask_returns_answer_with_citations() {
    let h = harness(diabetes_hits(), no_web(), CannedModel::new(ANSWER), FeatureConfig::default());

    let response = h.pipeline.ask("s1", "What is diabetes?").await.unwrap();

    assert_eq!(response.answer, ANSWER);
    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.sources[0].url, "https://en.wikipedia.org/wiki/Diabetes");
    assert_eq!(
        response.citations,
        response.sources.iter().map(|s| s.url.clone()).collect::<Vec<_>>()
    );
    assert_eq!(response.query_info.processed, "What is diabetes?");

    let prompts = h.model.answer_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Question: What is diabetes?"));
    assert!(prompts[0].contains("[1]\nTitle: Diabetes - Wikipedia"));

    let summary = h.pipeline.session_summary("s1").await.unwrap();
    assert_eq!(summary.history_length, 1);
    assert_eq!(summary.message_count, 2);
}

#[tokio::test]
async fn test_follow_up_searches_rewritten_query() {
    let mut model = CannedModel::new(ANSWER);
    model.follow_up = true;
    model.rewrite = "diabetes symptoms".to_string();
    let features = FeatureConfig {
        query_rewriting: true,
        ..FeatureConfig::default()
    };
    let h = harness(diabetes_hits(), no_web(), model, features);

    h.pipeline.ask("s1", "What is diabetes?").await.unwrap();
    let response = h.pipeline.ask("s1", "What are the symptoms?").await.unwrap();

    assert!(response.query_info.is_contextual);
    assert_eq!(response.query_info.original, "What are the symptoms?");
    assert_eq!(h.search.queries(), vec!["What is diabetes?", "diabetes symptoms"]);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let mut model = CannedModel::new(ANSWER);
    model.follow_up = true;
    model.rewrite = "diabetes symptoms".to_string();
    let features = FeatureConfig {
        query_rewriting: true,
        ..FeatureConfig::default()
    };
    let h = harness(diabetes_hits(), no_web(), model, features);

    h.pipeline.ask("alice", "What is diabetes?").await.unwrap();
    let response = h.pipeline.ask("bob", "What are the symptoms?").await.unwrap();

    assert!(!response.query_info.is_contextual);
    assert_eq!(response.query_info.processed, "What are the symptoms?");
}

#[tokio::test]
async fn test_no_search_results() {
    let h = harness(vec![], no_web(), CannedModel::new(ANSWER), FeatureConfig::default());

    let err = h.pipeline.ask("s1", "What is diabetes?").await.unwrap_err();

    assert!(matches!(err, AskError::NoSources { .. }));
    assert_eq!(err.error_code(), "NO_SOURCES");
    assert!(!err.is_upstream());
    assert!(h.model.answer_prompts().is_empty());
}

#[tokio::test]
async fn test_no_usable_content() {
    let boilerplate = "Cookie policy. Privacy policy. Terms of service. Sign up for our newsletter.";
    let hits = vec![
        hit("Diabetes", "https://a.example.com/diabetes", boilerplate),
        hit("Diabetes", "https://b.example.com/diabetes", boilerplate),
    ];
    let web = no_web()
        .page("https://a.example.com/diabetes", 403, String::new())
        .page("https://b.example.com/diabetes", 403, String::new());
    let h = harness(hits, web, CannedModel::new(ANSWER), FeatureConfig::default());

    let err = h.pipeline.ask("s1", "What is diabetes?").await.unwrap_err();

    assert!(matches!(err, AskError::NoUsableContent { .. }));
    assert!(!err.user_message().is_empty());
}

#[tokio::test]
async fn test_short_question_rejected() {
    let h = harness(diabetes_hits(), no_web(), CannedModel::new(ANSWER), FeatureConfig::default());

    let err = h.pipeline.ask("s1", " hi ").await.unwrap_err();

    assert!(matches!(err, AskError::InvalidQuestion(_)));
    assert!(h.search.queries().is_empty());
}

#[tokio::test]
async fn test_streamed_answer_records_turn() {
    let features = FeatureConfig {
        streaming: true,
        ..FeatureConfig::default()
    };
    let h = harness(diabetes_hits(), no_web(), CannedModel::new(ANSWER), features);

    let mut response = h.pipeline.ask_stream("s1", "What is diabetes?").await.unwrap();
    assert_eq!(response.sources.len(), 2);

    let mut text = String::new();
    let mut tokens = 0;
    while let Some(event) = response.tokens.next().await {
        match event {
            StreamEvent::Token(token) => {
                tokens += 1;
                text.push_str(&token);
            }
            StreamEvent::Done { text: full, .. } => {
                assert_eq!(full, ANSWER);
                break;
            }
            StreamEvent::Error(message) => panic!("stream failed: {}", message),
        }
    }

    assert!(tokens > 1);
    assert_eq!(text, ANSWER);

    let summary = h.pipeline.session_summary("s1").await.unwrap();
    assert_eq!(summary.message_count, 2);
}

#[tokio::test]
async fn test_stream_without_streaming_replays_whole_answer() {
    let h = harness(diabetes_hits(), no_web(), CannedModel::new(ANSWER), FeatureConfig::default());

    let response = h.pipeline.ask_stream("s1", "What is diabetes?").await.unwrap();
    let events: Vec<StreamEvent> = response.tokens.collect().await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::Token(ANSWER.to_string()));
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn test_related_questions() {
    let mut model = CannedModel::new(ANSWER);
    model.related = r#"["What causes diabetes?", "How is diabetes treated?"]"#.to_string();
    let h = harness(diabetes_hits(), no_web(), model, FeatureConfig::default());

    let questions = h
        .pipeline
        .related_questions("What is diabetes?", Some(ANSWER))
        .await
        .unwrap();

    assert_eq!(questions, vec!["What causes diabetes?", "How is diabetes treated?"]);
}

#[tokio::test]
async fn test_clear_context_resets_session() {
    let h = harness(diabetes_hits(), no_web(), CannedModel::new(ANSWER), FeatureConfig::default());
    h.pipeline.ask("s1", "What is diabetes?").await.unwrap();

    assert!(h.pipeline.clear_context("s1").await);

    let summary = h.pipeline.session_summary("s1").await.unwrap();
    assert_eq!(summary.history_length, 0);
    assert_eq!(summary.message_count, 0);
    assert!(h.cache.stats().search.keys > 0);
}
