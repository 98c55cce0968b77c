// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page scraping with retry, block detection and bounded batches

use futures::future::join_all;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::{Host, Url};

use super::config::ScrapeConfig;
use super::extractor::extract_main_content;
use super::transport::{HttpTransport, PageTransport};
use crate::cache::CacheManager;

/// Scrape failure types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScrapeError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsafe URL blocked: {0}")]
    UnsafeUrl(String),

    /// 401/403: the site refuses automated access
    #[error("Access blocked (HTTP {status}) for: {url}")]
    Blocked { url: String, status: u16 },

    #[error("HTTP {status} for: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Timeout fetching: {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("No content extracted from: {url}")]
    NoContent { url: String },

    #[error("Content too short ({chars} chars) from: {url}")]
    ContentTooShort { url: String, chars: usize },

    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Scrape batch closed before {0} was fetched")]
    Cancelled(String),
}

impl ScrapeError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Timeout { .. }
            | Self::Network { .. }
            | Self::NoContent { .. }
            | Self::ContentTooShort { .. } => true,
            Self::InvalidUrl(_)
            | Self::UnsafeUrl(_)
            | Self::Blocked { .. }
            | Self::RetriesExhausted { .. }
            | Self::Cancelled(_) => false,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::UnsafeUrl(_) => "UNSAFE_URL",
            Self::Blocked { .. } => "BLOCKED",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Network { .. } => "NETWORK",
            Self::NoContent { .. } => "NO_CONTENT",
            Self::ContentTooShort { .. } => "CONTENT_TOO_SHORT",
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::Cancelled(_) => "CANCELLED",
        }
    }
}

/// Result of scraping one URL in a batch
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub url: String,
    pub content: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub error_kind: Option<ScrapeError>,
}

impl ScrapeOutcome {
    fn success(url: &str, content: String) -> Self {
        Self {
            url: url.to_string(),
            content: Some(content),
            success: true,
            error: None,
            error_kind: None,
        }
    }

    fn failure(url: &str, error: ScrapeError) -> Self {
        Self {
            url: url.to_string(),
            content: None,
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error),
        }
    }
}

/// Fetches pages and extracts their main text
pub struct Scraper {
    transport: Arc<dyn PageTransport>,
    cache: Arc<CacheManager>,
    config: ScrapeConfig,
}

impl Scraper {
    /// Create a scraper backed by real HTTP
    pub fn new(config: ScrapeConfig, cache: Arc<CacheManager>) -> Self {
        let transport = Arc::new(HttpTransport::new(&config));
        Self::with_transport(transport, cache, config)
    }

    /// Create a scraper over a custom transport
    pub fn with_transport(
        transport: Arc<dyn PageTransport>,
        cache: Arc<CacheManager>,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Fetch one page and extract its main content, single attempt
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        check_url(url)?;

        let response = self.transport.get(url).await?;
        match response.status {
            401 | 403 => {
                return Err(ScrapeError::Blocked {
                    url: url.to_string(),
                    status: response.status,
                })
            }
            200..=299 => {}
            status => {
                return Err(ScrapeError::HttpStatus {
                    url: url.to_string(),
                    status,
                })
            }
        }

        let text = extract_main_content(&response.body, self.config.max_page_chars);
        if text.trim().is_empty() {
            return Err(ScrapeError::NoContent {
                url: url.to_string(),
            });
        }
        let chars = text.chars().count();
        if chars < self.config.min_content_chars {
            return Err(ScrapeError::ContentTooShort {
                url: url.to_string(),
                chars,
            });
        }
        Ok(text)
    }

    /// Fetch a page, retrying transient failures with linear backoff
    ///
    /// Blocked responses and unsafe URLs fail on the first attempt.
    pub async fn scrape_with_retry(&self, url: &str, max_attempts: u32) -> Result<String, ScrapeError> {
        if let Some(cached) = self.cache.get_scrape(url) {
            debug!("Scrape cache hit for: {}", url);
            return Ok(cached);
        }

        let attempts = max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_page(url).await {
                Ok(content) => {
                    info!("Scraped {} chars from {} (attempt {})", content.len(), url, attempt);
                    self.cache.set_scrape(url, &content);
                    return Ok(content);
                }
                Err(e @ ScrapeError::Blocked { .. }) => {
                    info!("{}; not retrying", e);
                    return Err(e);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("Scrape failed for {}: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Scrape attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(ScrapeError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last_error,
        })
    }

    /// Delay after the given failed attempt: `min(base * attempt, cap)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = self
            .config
            .backoff_base_ms
            .saturating_mul(u64::from(attempt))
            .min(self.config.backoff_cap_ms);
        Duration::from_millis(delay)
    }

    /// Scrape all URLs with at most `max_concurrent` fetches in flight
    ///
    /// Returns one outcome per URL in input order. Failures never abort
    /// sibling fetches.
    pub async fn scrape_batch(&self, urls: &[String], max_concurrent: usize) -> Vec<ScrapeOutcome> {
        if urls.is_empty() {
            return Vec::new();
        }
        let gate = Semaphore::new(max_concurrent.max(1));
        debug!("Scraping {} URLs, {} at a time", urls.len(), max_concurrent.max(1));

        let tasks = urls.iter().map(|url| {
            let gate = &gate;
            async move {
                let _permit = match gate.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return ScrapeOutcome::failure(url, ScrapeError::Cancelled(url.clone())),
                };
                match self.scrape_with_retry(url, self.config.max_attempts).await {
                    Ok(content) => ScrapeOutcome::success(url, content),
                    Err(e) => ScrapeOutcome::failure(url, e),
                }
            }
        });

        let outcomes = join_all(tasks).await;
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!("Scrape batch finished: {}/{} succeeded", succeeded, outcomes.len());
        outcomes
    }
}

/// Reject URLs that are malformed, non-HTTP or point at local/private hosts
pub fn check_url(url: &str) -> Result<(), ScrapeError> {
    let parsed = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl(url.to_string()))?;
    if is_safe_url(&parsed) {
        Ok(())
    } else {
        Err(ScrapeError::UnsafeUrl(url.to_string()))
    }
}

fn is_safe_url(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return false;
            }
            domain.parse::<IpAddr>().map_or(true, |ip| is_public_ip(&ip))
        }
        Some(Host::Ipv4(ip)) => is_public_ip(&IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_public_ip(&IpAddr::V6(ip)),
        None => false,
    }
}

fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}
