// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wire types for the Ollama generate API

use serde::{Deserialize, Serialize};

/// Sampling options sent with a generate request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    /// Token cap for the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl GenerateOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            num_predict: None,
        }
    }

    /// Short, low-variance replies for classification and rewriting
    pub fn analysis() -> Self {
        Self {
            temperature: 0.3,
            num_predict: Some(100),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::with_temperature(0.7)
    }
}

/// Body of `POST /api/generate`
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: GenerateOptions,
}

/// Non-streaming reply
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// One newline-delimited JSON fragment of a streaming reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}
