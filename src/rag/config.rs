// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for source preparation

use std::env;

/// Limits applied while turning search hits into prompt sources
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Ranked sources kept after deduplication (default: 5)
    pub max_sources: usize,
    /// Maximum bytes of content per prepared source (default: 2000)
    pub max_content_length: usize,
    /// Hits kept per hostname (default: 2)
    pub max_per_domain: usize,
    /// URLs queued for scraping per request, also the batch concurrency ceiling (default: 2)
    pub max_scrape_targets: usize,
}

impl PrepareConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_sources: env::var("MAX_SEARCH_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_sources),
            max_content_length: env::var("MAX_CONTENT_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_content_length),
            max_per_domain: env::var("MAX_PER_DOMAIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_per_domain),
            max_scrape_targets: env::var("MAX_SCRAPE_TARGETS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_scrape_targets),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_sources == 0 {
            return Err("max_sources must be at least 1".to_string());
        }
        if self.max_content_length < 100 {
            return Err("max_content_length must be at least 100".to_string());
        }
        if self.max_per_domain == 0 {
            return Err("max_per_domain must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            max_sources: 5,
            max_content_length: 2000,
            max_per_domain: 2,
            max_scrape_targets: 2,
        }
    }
}
