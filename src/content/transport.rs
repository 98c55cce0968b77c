// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport for page fetching
//!
//! Each request gets a fresh client with its own cookie jar, a randomly
//! chosen desktop user agent and browser-like headers.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::config::ScrapeConfig;
use super::scraper::ScrapeError;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Raw response from a page fetch
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    /// Body text; empty for non-success statuses
    pub body: String,
}

/// Fetches raw pages
///
/// Implementations report HTTP status in the response and reserve `Err`
/// for transport failures (connect, timeout, body read).
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PageResponse, ScrapeError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    timeout: Duration,
    max_redirects: usize,
}

impl HttpTransport {
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_redirects: config.max_redirects,
        }
    }

    fn build_client(&self, url: &str) -> Result<Client, ScrapeError> {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .timeout(self.timeout)
            .user_agent(random_user_agent())
            .default_headers(browser_headers(url))
            .build()
            .map_err(|e| ScrapeError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl PageTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<PageResponse, ScrapeError> {
        let client = self.build_client(url)?;
        debug!("Fetching page: {}", url);

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ScrapeError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Ok(PageResponse {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(|e| ScrapeError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(PageResponse {
            status: status.as_u16(),
            body,
        })
    }
}

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

fn browser_headers(url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    if let Ok(referer) = HeaderValue::from_str(url) {
        headers.insert(REFERER, referer);
    }
    headers
}
