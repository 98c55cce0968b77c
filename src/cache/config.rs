// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the response caches

use std::env;

/// TTLs and limits for the three cache classes
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Master switch; when false every lookup misses and every store is dropped
    pub enabled: bool,
    /// Search result TTL in seconds (default: 1800 = 30 minutes)
    pub search_ttl_secs: u64,
    /// Scraped page TTL in seconds (default: 86400 = 24 hours)
    pub scrape_ttl_secs: u64,
    /// Model response TTL in seconds (default: 3600 = 1 hour)
    pub llm_ttl_secs: u64,
    /// Maximum live entries per class before the oldest is evicted
    pub max_entries: usize,
    /// How often the background task purges expired entries
    pub purge_interval_secs: u64,
}

impl CacheConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            // Opt-in, matching the other feature flags
            enabled: env::var("ENABLE_CACHING")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            search_ttl_secs: env::var("CACHE_SEARCH_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1800),
            scrape_ttl_secs: env::var("CACHE_SCRAPE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400),
            llm_ttl_secs: env::var("CACHE_LLM_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            purge_interval_secs: 120,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("cache max_entries must be at least 1".to_string());
        }
        if self.purge_interval_secs == 0 {
            return Err("cache purge_interval_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_ttl_secs: 1800,
            scrape_ttl_secs: 86400,
            llm_ttl_secs: 3600,
            max_entries: 1000,
            purge_interval_secs: 120,
        }
    }
}
