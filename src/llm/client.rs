// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ollama generate client

use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::config::LlmConfig;
use super::errors::LlmError;
use super::stream::{forward_fragments, TokenStream};
use super::types::{GenerateOptions, GenerateRequest, GenerateResponse};

/// Text-generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a complete reply, trimmed
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, LlmError>;

    /// Generate a reply as a token stream
    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<TokenStream, LlmError>;

    fn name(&self) -> &str;
}

pub struct OllamaClient {
    client: Client,
    generate_url: String,
    model: String,
    timeout: Duration,
    skipped_total: Arc<AtomicU64>,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| LlmError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            generate_url: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            timeout,
            skipped_total: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }

    /// Malformed stream fragments skipped over the client's lifetime
    pub fn skipped_fragments_total(&self) -> u64 {
        self.skipped_total.load(Ordering::Relaxed)
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                timeout_ms: self.timeout_ms(),
            }
        } else {
            LlmError::Request(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        error!("LLM API error {}: {}", status, message);
        Err(LlmError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String, LlmError> {
        debug!("Generating (temperature {})", options.temperature);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&self.generate_url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        Ok(body.response.trim().to_string())
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<TokenStream, LlmError> {
        info!("Starting streamed generation");
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
            options,
        };

        // Only the wait for headers is bounded; the body streams for as long as it takes.
        let send = self.client.post(&self.generate_url).json(&request).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| LlmError::Timeout {
                timeout_ms: self.timeout_ms(),
            })?
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let (tx, stream) = TokenStream::channel();
        let chunks = Box::pin(response.bytes_stream());
        tokio::spawn(forward_fragments(chunks, tx, Arc::clone(&self.skipped_total)));
        Ok(stream)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
