// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the language-model collaborator

use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Ollama base URL (default: http://localhost:11434)
    pub base_url: String,
    /// Model name passed with every request (default: llama3)
    pub model: String,
    /// Request timeout in milliseconds; for streams it bounds the wait for headers (default: 30000)
    pub request_timeout_ms: u64,
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("OLLAMA_URL").unwrap_or(defaults.base_url),
            model: env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
            request_timeout_ms: env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        Url::parse(&self.base_url).map_err(|e| format!("invalid OLLAMA_URL: {}", e))?;
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            request_timeout_ms: 30000,
        }
    }
}
