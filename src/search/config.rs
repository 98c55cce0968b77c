// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the search collaborator

use std::env;

/// Configuration for web search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the SearXNG instance
    pub searxng_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Outbound rate limit (requests per minute)
    pub rate_limit_per_minute: u32,
    /// How long a request may wait for a rate-limit slot before failing
    pub rate_limit_wait_ms: u64,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            searxng_url: env::var("SEARXNG_URL")
                .unwrap_or_else(|_| "http://localhost:32768".to_string()),
            request_timeout_ms: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            rate_limit_per_minute: env::var("SEARCH_RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            rate_limit_wait_ms: 5000,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.searxng_url.trim().is_empty() {
            return Err("SEARXNG_URL must not be empty".to_string());
        }
        if url::Url::parse(&self.searxng_url).is_err() {
            return Err(format!("SEARXNG_URL is not a valid URL: {}", self.searxng_url));
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.rate_limit_per_minute == 0 {
            return Err("Rate limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            searxng_url: "http://localhost:32768".to_string(),
            request_timeout_ms: 30000,
            rate_limit_per_minute: 60,
            rate_limit_wait_ms: 5000,
        }
    }
}
