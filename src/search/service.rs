// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search service orchestration
//!
//! Coordinates the provider, the shared cache and outbound rate limiting.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::config::SearchConfig;
use super::provider::SearchProvider;
use super::rate_limiter::SearchRateLimiter;
use super::searxng::SearxngProvider;
use super::types::{SearchError, SearchHit};
use crate::cache::CacheManager;

/// Entry point for web searches
pub struct SearchService {
    provider: Arc<dyn SearchProvider>,
    cache: Arc<CacheManager>,
    rate_limiter: SearchRateLimiter,
}

impl SearchService {
    /// Create a service backed by SearXNG
    pub fn new(config: &SearchConfig, cache: Arc<CacheManager>) -> Result<Self, SearchError> {
        let provider = Arc::new(SearxngProvider::new(config)?);
        Ok(Self::with_provider(provider, cache, config))
    }

    /// Create a service around any provider
    pub fn with_provider(
        provider: Arc<dyn SearchProvider>,
        cache: Arc<CacheManager>,
        config: &SearchConfig,
    ) -> Self {
        let rate_limiter = SearchRateLimiter::new(
            config.rate_limit_per_minute,
            Duration::from_millis(config.rate_limit_wait_ms),
        );
        Self {
            provider,
            cache,
            rate_limiter,
        }
    }

    /// Search for `query`
    ///
    /// An empty list means the engine found nothing; errors mean the engine
    /// itself could not be used. Only non-empty result sets are cached.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        if let Some(hits) = self.cache.get_search(query) {
            debug!("Using cached results for: \"{}\"", query);
            return Ok(hits);
        }

        self.rate_limiter.acquire().await?;

        let start = Instant::now();
        let hits = match self.provider.search(query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search provider {} failed: {}", self.provider.name(), e);
                return Err(e);
            }
        };

        info!(
            "Search complete: {} results from {} in {}ms",
            hits.len(),
            self.provider.name(),
            start.elapsed().as_millis()
        );

        if !hits.is_empty() {
            self.cache.set_search(query, &hits);
        }

        Ok(hits)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
