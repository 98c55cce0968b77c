// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Outbound rate limiting for search requests

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::warn;

use super::types::SearchError;

/// Keeps this process from hammering the search engine
pub struct SearchRateLimiter {
    limiter: GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
    max_wait: Duration,
}

impl SearchRateLimiter {
    /// # Arguments
    /// * `requests_per_minute` - Sustained request budget; zero falls back to 60
    /// * `max_wait` - Longest a caller may queue for a slot
    pub fn new(requests_per_minute: u32, max_wait: Duration) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN.saturating_add(59));
        Self {
            limiter: GovRateLimiter::direct(Quota::per_minute(rpm)),
            requests_per_minute: rpm.get(),
            max_wait,
        }
    }

    /// Wait for a slot, failing with `RateLimited` if none frees up in time
    pub async fn acquire(&self) -> Result<(), SearchError> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        match tokio::time::timeout(self.max_wait, self.limiter.until_ready()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(
                    "Search rate limit exhausted ({} per minute)",
                    self.requests_per_minute
                );
                Err(SearchError::RateLimited {
                    retry_after_secs: (60 / self.requests_per_minute.max(1)).max(1) as u64,
                })
            }
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}
