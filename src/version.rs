// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for Atlas RAG

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-retrieval-pipeline-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Capabilities in this version
pub const FEATURES: &[&str] = &[
    "searxng-search",
    "source-ranking",
    "snippet-reuse",
    "bounded-scraping",
    "block-detection",
    "smart-chunking",
    "ttl-caching",
    "query-rewriting",
    "conversation-sessions",
    "token-streaming",
    "related-questions",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Atlas RAG {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Version info as JSON for the stats view
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
