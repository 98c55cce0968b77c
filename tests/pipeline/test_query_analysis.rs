// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Follow-up detection, rewriting and topic tracking across a conversation

use super::support::CannedModel;
use atlas_rag::cache::CacheManager;
use atlas_rag::query::{ConversationState, QueryAnalyzer};
use std::sync::Arc;

fn analyzer(model: CannedModel, rewriting: bool) -> QueryAnalyzer {
    QueryAnalyzer::new(Arc::new(model), Arc::new(CacheManager::disabled()), rewriting)
}

#[tokio::test]
async fn test_follow_up_is_rewritten_with_context() {
    let mut model = CannedModel::new("");
    model.follow_up = true;
    model.rewrite = "\"diabetes symptoms\"".to_string();
    model.topic = "diabetes".to_string();
    let analyzer = analyzer(model, true);
    let mut state = ConversationState::new();

    let first = analyzer.process_query(&mut state, "What is diabetes?").await;
    assert!(!first.is_contextual);
    assert_eq!(first.processed, "What is diabetes?");
    assert_eq!(first.topic.as_deref(), Some("diabetes"));

    let second = analyzer.process_query(&mut state, "What are the symptoms?").await;
    assert!(second.is_contextual);
    assert_eq!(second.original, "What are the symptoms?");
    assert_eq!(second.processed, "diabetes symptoms");
    assert_eq!(second.topic.as_deref(), Some("diabetes"));
    assert_eq!(state.history_len(), 2);
    assert_eq!(state.last_query(), Some("What are the symptoms?"));
}

#[tokio::test]
async fn test_unrelated_query_resets_conversation() {
    let mut model = CannedModel::new("");
    model.topic = "rust programming".to_string();
    let analyzer = analyzer(model, true);
    let mut state = ConversationState::new();

    analyzer.process_query(&mut state, "What is diabetes?").await;
    let analysis = analyzer.process_query(&mut state, "How do Rust lifetimes work?").await;

    assert!(!analysis.is_contextual);
    assert_eq!(analysis.processed, "How do Rust lifetimes work?");
    assert_eq!(analysis.topic.as_deref(), Some("rust programming"));
    assert_eq!(state.history_len(), 1);
}

#[tokio::test]
async fn test_empty_rewrite_falls_back_to_original() {
    let mut model = CannedModel::new("");
    model.follow_up = true;
    model.rewrite = "   ".to_string();
    let analyzer = analyzer(model, true);
    let mut state = ConversationState::new();

    analyzer.process_query(&mut state, "What is diabetes?").await;
    let analysis = analyzer.process_query(&mut state, "And the treatment?").await;

    assert!(analysis.is_contextual);
    assert_eq!(analysis.processed, "And the treatment?");
}

#[tokio::test]
async fn test_history_is_capped() {
    let mut model = CannedModel::new("");
    model.follow_up = true;
    model.rewrite = "diabetes follow-up".to_string();
    let analyzer = analyzer(model, true);
    let mut state = ConversationState::new();

    for i in 0..8 {
        analyzer
            .process_query(&mut state, &format!("Question number {}", i))
            .await;
    }

    assert_eq!(state.history_len(), 5);
    assert_eq!(state.last_query(), Some("Question number 7"));
}
