// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ask;
pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod llm;
pub mod prompts;
pub mod query;
pub mod rag;
pub mod search;
pub mod version;

pub use ask::{AskError, AskPipeline, AskResponse, AskStream};
pub use cache::{CacheConfig, CacheManager, CacheStats};
pub use config::{AtlasConfig, FeatureConfig};
pub use content::{ScrapeConfig, ScrapeError, Scraper};
pub use llm::{LanguageModel, LlmConfig, LlmError, OllamaClient, StreamEvent, TokenStream};
pub use query::{ConversationState, ConversationStore, QueryAnalysis, QueryAnalyzer};
pub use rag::{PrepareConfig, PreparedSource, SourceOrigin, SourcePreparer};
pub use search::{RankedSource, SearchConfig, SearchError, SearchHit, SearchProvider, SearchService, SourceRanker};
