// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question answering pipeline
//!
//! analyse query -> search -> prepare sources -> generate answer

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use super::errors::{validate_question, AskError};
use super::related::parse_related_questions;
use crate::cache::{CacheManager, CacheStats};
use crate::config::{AtlasConfig, FeatureConfig};
use crate::content::Scraper;
use crate::llm::{GenerateOptions, LanguageModel, OllamaClient, StreamEvent, TokenStream};
use crate::prompts;
use crate::query::{ConversationState, ConversationStore, QueryAnalysis, QueryAnalyzer, SessionSummary};
use crate::rag::{render_sources, PrepareConfig, PreparedSource, SourcePreparer, SourceRef};
use crate::search::SearchService;

/// Temperature for follow-up question suggestions
const RELATED_TEMPERATURE: f32 = 0.8;

/// A complete answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    /// Source URLs in citation order
    pub citations: Vec<String>,
    pub query_info: QueryAnalysis,
    pub sources: Vec<SourceRef>,
    pub processing_time_ms: u64,
}

/// A streamed answer: metadata up front, tokens as they arrive
pub struct AskStream {
    pub sources: Vec<SourceRef>,
    pub citations: Vec<String>,
    pub query_info: QueryAnalysis,
    pub tokens: TokenStream,
    started: Instant,
}

impl AskStream {
    /// Milliseconds since the request started
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

pub struct AskPipeline {
    analyzer: QueryAnalyzer,
    search: SearchService,
    preparer: SourcePreparer,
    model: Arc<dyn LanguageModel>,
    cache: Arc<CacheManager>,
    sessions: ConversationStore,
    streaming_enabled: bool,
}

impl AskPipeline {
    /// Build the pipeline against SearXNG and Ollama
    pub fn new(config: &AtlasConfig, cache: Arc<CacheManager>) -> Result<Self, AskError> {
        let search = SearchService::new(&config.search, Arc::clone(&cache))?;
        let model: Arc<dyn LanguageModel> = Arc::new(OllamaClient::new(&config.llm)?);
        let scraper = Arc::new(Scraper::new(config.scrape.clone(), Arc::clone(&cache)));
        Ok(Self::with_components(
            search,
            scraper,
            model,
            cache,
            config.prepare.clone(),
            &config.features,
        ))
    }

    /// Build the pipeline from already-constructed collaborators
    pub fn with_components(
        search: SearchService,
        scraper: Arc<Scraper>,
        model: Arc<dyn LanguageModel>,
        cache: Arc<CacheManager>,
        prepare: PrepareConfig,
        features: &FeatureConfig,
    ) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(Arc::clone(&model), Arc::clone(&cache), features.query_rewriting),
            search,
            preparer: SourcePreparer::new(prepare, scraper),
            model,
            cache,
            sessions: ConversationStore::new(features.max_context_messages),
            streaming_enabled: features.streaming,
        }
    }

    pub fn streaming_enabled(&self) -> bool {
        self.streaming_enabled
    }

    /// Answer a question within a conversation session
    pub async fn ask(&self, session_id: &str, question: &str) -> Result<AskResponse, AskError> {
        let started = Instant::now();
        let question = validate_question(question)?;
        info!("New question: \"{}\"", question);

        let handle = self.sessions.session(session_id).await;
        let mut state = handle.lock().await;

        let (query_info, sources) = self.retrieve(&mut state, question).await?;
        let prompt = prompts::answer_generation(question, &render_sources(&sources));
        let answer = self.generate_cached(&prompt, GenerateOptions::default()).await?;

        state.record_turn(question, &answer, self.sessions.max_context_messages());

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!("Request completed in {}ms", processing_time_ms);

        Ok(AskResponse {
            answer,
            citations: sources.iter().map(|s| s.url.clone()).collect(),
            query_info,
            sources: sources.iter().map(SourceRef::from).collect(),
            processing_time_ms,
        })
    }

    /// Answer a question as a token stream
    ///
    /// With streaming disabled the answer is generated in one call and
    /// replayed as a single token. The session stays locked until the
    /// stream finishes or is dropped.
    pub async fn ask_stream(&self, session_id: &str, question: &str) -> Result<AskStream, AskError> {
        let started = Instant::now();
        let question = validate_question(question)?;
        info!("New streamed question: \"{}\"", question);

        let handle = self.sessions.session(session_id).await;
        let mut state = handle.lock_owned().await;

        let (query_info, sources) = self.retrieve(&mut state, question).await?;
        let prompt = prompts::answer_generation(question, &render_sources(&sources));

        let inner = if self.streaming_enabled {
            self.model.generate_stream(&prompt, GenerateOptions::default()).await?
        } else {
            debug!("Streaming disabled, generating in one call");
            let answer = self.generate_cached(&prompt, GenerateOptions::default()).await?;
            TokenStream::from_events(vec![
                StreamEvent::Token(answer.clone()),
                StreamEvent::Done {
                    text: answer,
                    skipped_fragments: 0,
                },
            ])
        };

        let tokens = record_on_completion(
            inner,
            state,
            question.to_string(),
            self.sessions.max_context_messages(),
        );

        Ok(AskStream {
            citations: sources.iter().map(|s| s.url.clone()).collect(),
            sources: sources.iter().map(SourceRef::from).collect(),
            query_info,
            tokens,
            started,
        })
    }

    /// Suggest up to five follow-up questions; model failures yield none
    pub async fn related_questions(
        &self,
        question: &str,
        answer: Option<&str>,
    ) -> Result<Vec<String>, AskError> {
        let question = validate_question(question)?;
        let prompt = prompts::related_questions(question, answer);

        match self
            .generate_cached(&prompt, GenerateOptions::with_temperature(RELATED_TEMPERATURE))
            .await
        {
            Ok(reply) => {
                let questions = parse_related_questions(&reply);
                info!("Generated {} related questions", questions.len());
                Ok(questions)
            }
            Err(e) => {
                warn!("Related question generation failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Reset a conversation; returns false if the session is unknown
    pub async fn clear_context(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id).await
    }

    pub async fn session_summary(&self, session_id: &str) -> Option<SessionSummary> {
        self.sessions.summary(session_id).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Analyse the query, search and prepare sources
    async fn retrieve(
        &self,
        state: &mut ConversationState,
        question: &str,
    ) -> Result<(QueryAnalysis, Vec<PreparedSource>), AskError> {
        let query_info = self.analyzer.process_query(state, question).await;
        debug!(
            "Query analysis: contextual={}, processed=\"{}\", topic={:?}",
            query_info.is_contextual, query_info.processed, query_info.topic
        );

        let search_query = query_info.processed.clone();
        let hits = self.search.search(&search_query).await?;
        if hits.is_empty() {
            warn!("No search results for: \"{}\"", search_query);
            return Err(AskError::NoSources { query: search_query });
        }

        let sources = self.preparer.prepare_sources(&hits, &search_query).await;
        if sources.is_empty() {
            return Err(AskError::NoUsableContent { query: search_query });
        }

        Ok((query_info, sources))
    }

    /// Model call through the response cache
    async fn generate_cached(&self, prompt: &str, options: GenerateOptions) -> Result<String, AskError> {
        if let Some(cached) = self.cache.get_llm(prompt) {
            debug!("Using cached model response");
            return Ok(cached);
        }
        let answer = self.model.generate(prompt, options).await?;
        self.cache.set_llm(prompt, &answer);
        Ok(answer)
    }
}

/// Forward `inner`, recording the turn in the session once it completes
fn record_on_completion(
    mut inner: TokenStream,
    mut state: OwnedMutexGuard<ConversationState>,
    question: String,
    max_messages: usize,
) -> TokenStream {
    let (tx, outer) = TokenStream::channel();
    tokio::spawn(async move {
        while let Some(event) = inner.next().await {
            if let StreamEvent::Done { text, .. } = &event {
                state.record_turn(&question, text, max_messages);
            }
            let terminal = event.is_terminal();
            if tx.send(event).await.is_err() {
                debug!("Answer stream dropped by consumer");
                inner.cancel();
                break;
            }
            if terminal {
                break;
            }
        }
    });
    outer
}
