// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for answering a question

use thiserror::Error;

use crate::llm::LlmError;
use crate::search::SearchError;

/// Minimum question length in characters
pub const MIN_QUESTION_CHARS: usize = 3;

#[derive(Error, Debug)]
pub enum AskError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    /// The search engine could not be used
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// The language model could not be used
    #[error("Answer generation failed: {0}")]
    Model(#[from] LlmError),

    /// The search engine returned nothing
    #[error("No search results for: {query}")]
    NoSources { query: String },

    /// Results existed but none yielded usable content
    #[error("No usable content in search results for: {query}")]
    NoUsableContent { query: String },
}

impl AskError {
    /// Message suitable for showing to the person who asked
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidQuestion(_) => {
                format!("Please ask a question of at least {} characters.", MIN_QUESTION_CHARS)
            }
            Self::Search(_) => "The search service is unavailable right now. Please try again shortly.".to_string(),
            Self::Model(_) => "The answer service is unavailable right now. Please try again shortly.".to_string(),
            Self::NoSources { .. } => {
                "I couldn't find any relevant sources for that question. Try rephrasing it or asking something else.".to_string()
            }
            Self::NoUsableContent { .. } => {
                "I found search results but couldn't extract useful content from them. Try a different question.".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuestion(_) => "INVALID_QUESTION",
            Self::Search(_) => "SEARCH_UNAVAILABLE",
            Self::Model(e) => e.error_code(),
            Self::NoSources { .. } => "NO_SOURCES",
            Self::NoUsableContent { .. } => "NO_USABLE_CONTENT",
        }
    }

    /// Infrastructure failure, as opposed to a question with no answerable sources
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Search(_) | Self::Model(_))
    }
}

/// Reject questions that are too short to search for
pub fn validate_question(question: &str) -> Result<&str, AskError> {
    let trimmed = question.trim();
    if trimmed.chars().count() < MIN_QUESTION_CHARS {
        return Err(AskError::InvalidQuestion(format!(
            "question must be at least {} characters",
            MIN_QUESTION_CHARS
        )));
    }
    Ok(trimmed)
}
