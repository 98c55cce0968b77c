// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;

use super::types::{SearchError, SearchHit};

/// Trait for implementing search engines
///
/// The service layer owns caching and rate limiting; a provider only
/// performs the network call and maps its response into [`SearchHit`]s.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search, returning hits in engine order
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
