// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for page scraping
//!
//! Defines settings for HTTP fetching, retry/backoff and content limits.

use std::env;

/// Configuration for page scraping
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Maximum fetches in flight per batch (default: 5)
    pub max_concurrent: usize,
    /// Timeout per request in milliseconds (default: 10000)
    pub timeout_ms: u64,
    /// Attempts per URL including the first (default: 2)
    pub max_attempts: u32,
    /// Linear backoff step between attempts in milliseconds (default: 1000)
    pub backoff_base_ms: u64,
    /// Upper bound on a single backoff delay in milliseconds (default: 5000)
    pub backoff_cap_ms: u64,
    /// Redirects followed per request (default: 3)
    pub max_redirects: usize,
    /// Extracted text shorter than this is rejected (default: 100)
    pub min_content_chars: usize,
    /// Extracted text is truncated to this many bytes (default: 50000)
    pub max_page_chars: usize,
}

impl ScrapeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent: env::var("MAX_CONCURRENT_SCRAPES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_concurrent),
            timeout_ms: env::var("SCRAPE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_ms),
            max_attempts: env::var("SCRAPE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attempts),
            backoff_base_ms: env::var("SCRAPE_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backoff_base_ms),
            backoff_cap_ms: env::var("SCRAPE_BACKOFF_CAP_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backoff_cap_ms),
            ..defaults
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be at least 1".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be at least 1".to_string());
        }
        if self.backoff_cap_ms < self.backoff_base_ms {
            return Err("backoff_cap_ms must not be below backoff_base_ms".to_string());
        }
        Ok(())
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            timeout_ms: 10000,
            max_attempts: 2,
            backoff_base_ms: 1000,
            backoff_cap_ms: 5000,
            max_redirects: 3,
            min_content_chars: 100,
            max_page_chars: 50000,
        }
    }
}
