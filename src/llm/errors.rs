// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Could not reach the model service
    #[error("LLM service error: {0}")]
    Request(String),

    #[error("LLM request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("LLM API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    /// The token stream failed mid-way
    #[error("LLM stream error: {0}")]
    Stream(String),
}

impl LlmError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "LLM_UNAVAILABLE",
            Self::Timeout { .. } => "LLM_TIMEOUT",
            Self::ApiError { .. } => "LLM_API_ERROR",
            Self::InvalidResponse(_) => "LLM_INVALID_RESPONSE",
            Self::Stream(_) => "LLM_STREAM_ERROR",
        }
    }
}
