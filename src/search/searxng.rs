// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! SearXNG search provider
//!
//! Queries a self-hosted SearXNG instance through its JSON API:
//! `GET <base>/search?q=<query>&format=json`.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::config::SearchConfig;
use super::provider::SearchProvider;
use super::types::{SearchEngineResponse, SearchError, SearchHit};

/// SearXNG JSON API provider
pub struct SearxngProvider {
    client: Client,
    search_url: String,
    timeout_ms: u64,
}

impl SearxngProvider {
    /// Create a provider for the instance named in the configuration
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| SearchError::Unavailable {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            search_url: Self::search_url(&config.searxng_url),
            timeout_ms: config.request_timeout_ms,
        })
    }

    fn search_url(base: &str) -> String {
        format!("{}/search", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        debug!("SearXNG query: \"{}\"", query);

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    SearchError::Unavailable {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchEngineResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        info!("SearXNG found {} results for \"{}\"", body.results.len(), query);
        Ok(body.results)
    }

    fn name(&self) -> &'static str {
        "searxng"
    }
}
