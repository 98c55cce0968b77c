// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Language-model collaborator
//!
//! An Ollama-compatible client behind the [`LanguageModel`] trait, with
//! streamed replies delivered as a [`TokenStream`].

pub mod client;
pub mod config;
pub mod errors;
pub mod stream;
pub mod types;

pub use client::{LanguageModel, OllamaClient};
pub use config::LlmConfig;
pub use errors::LlmError;
pub use stream::{NdjsonDecoder, StreamEvent, TokenStream};
pub use types::GenerateOptions;
