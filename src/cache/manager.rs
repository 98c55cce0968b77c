// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-class cache shared by search, scraping and model calls

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::CacheConfig;
use super::store::TtlStore;
use crate::search::types::SearchHit;

/// The three independently configured data classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    Search,
    Scrape,
    Llm,
}

impl CacheClass {
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheClass::Search => "search",
            CacheClass::Scrape => "scrape",
            CacheClass::Llm => "llm",
        }
    }
}

/// Normalize free text for keying: lowercase and trim
pub fn normalize_text(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Key for free-text input, case- and surrounding-whitespace-insensitive
pub fn text_key(class: CacheClass, input: &str) -> String {
    hashed_key(class, &normalize_text(input))
}

fn hashed_key(class: CacheClass, normalized: &str) -> String {
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{}:{}", class.prefix(), hex::encode(digest))
}

/// Statistics for one cache class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub hits: u64,
    pub misses: u64,
    /// Hit percentage rounded to two decimals; absent before any lookup
    pub hit_rate: Option<f64>,
    /// Live (unexpired) entries
    pub keys: usize,
}

impl ClassStats {
    fn from_store<V: Clone>(store: &TtlStore<V>) -> Self {
        let (hits, misses) = store.counters();
        let total = hits + misses;
        let hit_rate = if total > 0 {
            Some((hits as f64 / total as f64 * 10_000.0).round() / 100.0)
        } else {
            None
        };
        Self {
            hits,
            misses,
            hit_rate,
            keys: store.live_count(),
        }
    }
}

/// Statistics for all cache classes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub search: ClassStats,
    pub scrape: ClassStats,
    pub llm: ClassStats,
}

/// Injected cache service with explicit lifecycle
///
/// Construct once with [`CacheManager::new`], share behind an `Arc`, and call
/// [`CacheManager::shutdown`] when the process is done with it.
pub struct CacheManager {
    enabled: bool,
    search: TtlStore<Vec<SearchHit>>,
    scrape: TtlStore<String>,
    llm: TtlStore<String>,
    purge_interval: Duration,
    shutdown: CancellationToken,
}

impl CacheManager {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            search: TtlStore::new(config.search_ttl_secs, config.max_entries),
            scrape: TtlStore::new(config.scrape_ttl_secs, config.max_entries),
            llm: TtlStore::new(config.llm_ttl_secs, config.max_entries),
            purge_interval: Duration::from_secs(config.purge_interval_secs.max(1)),
            shutdown: CancellationToken::new(),
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_search(&self, query: &str) -> Option<Vec<SearchHit>> {
        if !self.enabled {
            return None;
        }
        let value = self.search.get(&text_key(CacheClass::Search, query));
        if let Some(ref hits) = value {
            debug!("Search cache HIT: \"{}\" ({} results)", query, hits.len());
        }
        value
    }

    pub fn set_search(&self, query: &str, hits: &[SearchHit]) {
        if !self.enabled {
            return;
        }
        self.search
            .insert(text_key(CacheClass::Search, query), hits.to_vec());
        debug!("Search cache SET: \"{}\" ({} results)", query, hits.len());
    }

    pub fn get_scrape(&self, url: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let value = self.scrape.get(&text_key(CacheClass::Scrape, url));
        if value.is_some() {
            debug!("Scrape cache HIT: {}", url);
        }
        value
    }

    pub fn set_scrape(&self, url: &str, content: &str) {
        if !self.enabled {
            return;
        }
        self.scrape
            .insert(text_key(CacheClass::Scrape, url), content.to_string());
        debug!("Scrape cache SET: {}", url);
    }

    pub fn get_llm(&self, prompt: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let value = self.llm.get(&text_key(CacheClass::Llm, prompt));
        if value.is_some() {
            debug!("LLM cache HIT: {}", preview(prompt));
        }
        value
    }

    pub fn set_llm(&self, prompt: &str, response: &str) {
        if !self.enabled {
            return;
        }
        self.llm
            .insert(text_key(CacheClass::Llm, prompt), response.to_string());
        debug!("LLM cache SET: {}", preview(prompt));
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            search: ClassStats::from_store(&self.search),
            scrape: ClassStats::from_store(&self.scrape),
            llm: ClassStats::from_store(&self.llm),
        }
    }

    /// Remove expired entries from every class
    pub fn purge_expired(&self) -> usize {
        self.search.purge_expired() + self.scrape.purge_expired() + self.llm.purge_expired()
    }

    /// Drop every entry in every class
    pub fn flush(&self) {
        self.search.clear();
        self.scrape.clear();
        self.llm.clear();
        info!("All caches cleared");
    }

    /// Start the periodic expiry purge; it stops on [`CacheManager::shutdown`]
    pub fn spawn_purge_task(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let token = self.shutdown.clone();
        let period = self.purge_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!("Purged {} expired cache entries", removed);
                        }
                    }
                }
            }
        })
    }

    /// Stop the purge task and flush all entries
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.flush();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    format!("{}...", head)
}
