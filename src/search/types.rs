// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for web search results

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single raw hit returned by the search engine
///
/// Missing fields default rather than fail: `title`, `url` and `snippet`
/// become empty strings and `published_date` becomes `None`. A hit with an
/// empty or unparsable URL is later dropped by deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Title of the result page
    #[serde(default)]
    pub title: String,
    /// URL of the result page
    #[serde(default)]
    pub url: String,
    /// Snippet text; the engine calls this field `content`
    #[serde(default, rename = "content")]
    pub snippet: String,
    /// Publication date as reported by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl SearchHit {
    /// Parse `published_date` in the formats search engines commonly emit
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_date.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

/// A search hit with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSource {
    #[serde(flatten)]
    pub hit: SearchHit,
    pub relevance_score: f64,
}

/// Response body of the search engine's JSON API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchEngineResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Errors from the search collaborator
#[derive(Debug, Error)]
pub enum SearchError {
    /// Engine unreachable or the request failed in transit
    #[error("Search service unavailable: {message}")]
    Unavailable {
        /// Underlying failure
        message: String,
    },

    /// Engine answered with a non-success status
    #[error("Search API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Outbound rate limit exhausted
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Engine answered with a body that is not the expected JSON
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}
