// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search and source ranking
//!
//! - [`SearchService`] queries the search engine through a [`SearchProvider`],
//!   consulting the shared cache and an outbound rate limiter
//! - [`SourceRanker`] scores, filters and deduplicates the raw hits

pub mod config;
pub mod provider;
pub mod ranker;
pub mod rate_limiter;
pub mod searxng;
pub mod service;
pub mod types;

pub use config::SearchConfig;
pub use provider::SearchProvider;
pub use ranker::SourceRanker;
pub use searxng::SearxngProvider;
pub use service::SearchService;
pub use types::{RankedSource, SearchError, SearchHit};
