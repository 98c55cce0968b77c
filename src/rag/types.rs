// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prepared source types

use serde::{Deserialize, Serialize};

use crate::search::types::RankedSource;

/// Where a prepared source's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceOrigin {
    /// The search engine snippet was good enough
    SearchSnippet,
    /// The page was fetched and extracted
    Scrape,
}

/// A source ready to be rendered into the answer prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedSource {
    pub title: String,
    pub url: String,
    pub content: String,
    pub relevance_score: f64,
    pub origin: SourceOrigin,
}

impl PreparedSource {
    /// Build from a ranked hit; an empty title becomes "Untitled"
    pub fn from_ranked(source: &RankedSource, content: String, origin: SourceOrigin) -> Self {
        let title = source.hit.title.trim();
        Self {
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title.to_string()
            },
            url: source.hit.url.clone(),
            content,
            relevance_score: source.relevance_score,
            origin,
        }
    }
}

/// Title/URL pair shown to the user as a citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
}

impl From<&PreparedSource> for SourceRef {
    fn from(source: &PreparedSource) -> Self {
        Self {
            title: source.title.clone(),
            url: source.url.clone(),
        }
    }
}
