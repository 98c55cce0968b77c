// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversational query analysis
//!
//! Decides whether a query follows on from the previous one, rewrites
//! follow-ups into standalone search queries and tracks the topic. Every
//! model call here is auxiliary: failures fall back to safe defaults.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::ConversationState;
use crate::cache::CacheManager;
use crate::llm::{GenerateOptions, LanguageModel};
use crate::prompts;

/// History entries passed to the rewriting prompt
const REWRITE_HISTORY: usize = 3;

/// Result of analysing one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    pub original: String,
    /// Query to send to the search engine
    pub processed: String,
    pub is_contextual: bool,
    pub topic: Option<String>,
}

pub struct QueryAnalyzer {
    model: Arc<dyn LanguageModel>,
    cache: Arc<CacheManager>,
    rewriting_enabled: bool,
}

impl QueryAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>, cache: Arc<CacheManager>, rewriting_enabled: bool) -> Self {
        Self {
            model,
            cache,
            rewriting_enabled,
        }
    }

    pub fn rewriting_enabled(&self) -> bool {
        self.rewriting_enabled
    }

    /// Analyse `query` against `state` and advance the conversation
    pub async fn process_query(&self, state: &mut ConversationState, query: &str) -> QueryAnalysis {
        let mut processed = query.to_string();
        let mut is_contextual = false;

        if !state.is_fresh() {
            is_contextual = self.is_contextual(state, query).await;
            if is_contextual {
                processed = self.rewrite_query(state, query).await;
            } else {
                info!("New topic detected, clearing conversation context");
                state.clear();
            }
        }

        if !is_contextual {
            let topic = self.extract_topic(&processed).await;
            state.set_topic(topic);
        }

        state.push_query(query);

        QueryAnalysis {
            original: query.to_string(),
            processed,
            is_contextual,
            topic: state.topic().map(str::to_string),
        }
    }

    /// Whether `query` continues the conversation; `false` on any doubt
    pub async fn is_contextual(&self, state: &ConversationState, query: &str) -> bool {
        if !self.rewriting_enabled {
            return false;
        }
        let Some(previous) = state.last_query() else {
            return false;
        };

        let prompt = prompts::context_detection(previous, query);
        let contextual = self
            .call_model(&prompt)
            .await
            .map_or(false, |reply| reply.to_uppercase().contains("YES"));

        debug!(
            "Context check: \"{}\" -> {}",
            query,
            if contextual { "CONTEXTUAL" } else { "NEW TOPIC" }
        );
        contextual
    }

    /// Standalone rewrite of a follow-up; the original query on failure
    pub async fn rewrite_query(&self, state: &ConversationState, query: &str) -> String {
        if !self.rewriting_enabled {
            return query.to_string();
        }
        let Some(previous) = state.last_query() else {
            return query.to_string();
        };

        let history = state.recent_history(REWRITE_HISTORY);
        let prompt = prompts::query_rewriting(previous, query, &history);

        match self.call_model(&prompt).await.map(|r| strip_quotes(&r)) {
            Some(rewritten) if !rewritten.is_empty() => {
                info!("Query rewritten: \"{}\" -> \"{}\"", query, rewritten);
                rewritten
            }
            _ => {
                warn!("Query rewriting failed, using original query");
                query.to_string()
            }
        }
    }

    /// Short topic label, or `None` when the model gives nothing
    pub async fn extract_topic(&self, query: &str) -> Option<String> {
        let prompt = prompts::topic_extraction(query);
        let topic = strip_quotes(&self.call_model(&prompt).await?);
        if topic.is_empty() {
            return None;
        }
        debug!("Topic extracted: \"{}\"", topic);
        Some(topic)
    }

    /// Cached low-temperature model call; `None` on failure or empty reply
    async fn call_model(&self, prompt: &str) -> Option<String> {
        if let Some(cached) = self.cache.get_llm(prompt) {
            return Some(cached);
        }
        match self.model.generate(prompt, GenerateOptions::analysis()).await {
            Ok(reply) if !reply.trim().is_empty() => {
                let reply = reply.trim().to_string();
                self.cache.set_llm(prompt, &reply);
                Some(reply)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Analysis model call failed: {}", e);
                None
            }
        }
    }
}

/// Trim and drop one leading and one trailing quote character
fn strip_quotes(text: &str) -> String {
    let text = text.trim();
    let is_quote = |c: char| c == '"' || c == '\'';
    let text = text.strip_prefix(is_quote).unwrap_or(text);
    let text = text.strip_suffix(is_quote).unwrap_or(text);
    text.trim().to_string()
}
