// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Top-level configuration
//!
//! Aggregates every component's configuration, loaded from environment
//! variables (optionally seeded from a `.env` file by the binary).

use std::env;

use crate::cache::CacheConfig;
use crate::content::ScrapeConfig;
use crate::llm::LlmConfig;
use crate::rag::PrepareConfig;
use crate::search::SearchConfig;

/// Optional behaviours, all off unless set to `true`
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Stream answers token by token (ENABLE_STREAMING)
    pub streaming: bool,
    /// Detect follow-ups and rewrite them (ENABLE_QUERY_REWRITING)
    pub query_rewriting: bool,
    /// Transcript messages kept per session (MAX_CONTEXT_MESSAGES, default: 20)
    pub max_context_messages: usize,
}

impl FeatureConfig {
    pub fn from_env() -> Self {
        Self {
            streaming: flag("ENABLE_STREAMING"),
            query_rewriting: flag("ENABLE_QUERY_REWRITING"),
            max_context_messages: env::var("MAX_CONTEXT_MESSAGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            streaming: false,
            query_rewriting: false,
            max_context_messages: 20,
        }
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default)]
pub struct AtlasConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub prepare: PrepareConfig,
    pub scrape: ScrapeConfig,
    pub cache: CacheConfig,
    pub features: FeatureConfig,
}

impl AtlasConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            search: SearchConfig::from_env(),
            llm: LlmConfig::from_env(),
            prepare: PrepareConfig::from_env(),
            scrape: ScrapeConfig::from_env(),
            cache: CacheConfig::from_env(),
            features: FeatureConfig::from_env(),
        }
    }

    /// Validate every section, prefixing errors with the section name
    pub fn validate(&self) -> Result<(), String> {
        self.search.validate().map_err(|e| format!("search: {}", e))?;
        self.llm.validate().map_err(|e| format!("llm: {}", e))?;
        self.prepare.validate().map_err(|e| format!("sources: {}", e))?;
        self.scrape.validate().map_err(|e| format!("scrape: {}", e))?;
        self.cache.validate().map_err(|e| format!("cache: {}", e))?;
        if self.features.max_context_messages < 2 {
            return Err("features: max_context_messages must be at least 2".to_string());
        }
        Ok(())
    }
}
