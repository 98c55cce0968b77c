// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-conversation state

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Raw queries kept for context detection and rewriting
pub const MAX_HISTORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Snapshot of a conversation for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub topic: Option<String>,
    pub last_query: Option<String>,
    pub history_length: usize,
    pub message_count: usize,
}

/// State of one conversation
///
/// Fresh while `last_query` is `None`, contextual afterwards.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    history: VecDeque<String>,
    last_query: Option<String>,
    current_topic: Option<String>,
    transcript: VecDeque<ChatMessage>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self) -> bool {
        self.last_query.is_none()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.current_topic.as_deref()
    }

    pub fn history(&self) -> impl Iterator<Item = &String> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The most recent `n` queries, oldest first
    pub fn recent_history(&self, n: usize) -> Vec<String> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub(crate) fn set_topic(&mut self, topic: Option<String>) {
        self.current_topic = topic;
    }

    /// Record a query as the latest turn, evicting the oldest beyond the cap
    pub(crate) fn push_query(&mut self, query: &str) {
        self.history.push_back(query.to_string());
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
        self.last_query = Some(query.to_string());
    }

    /// Append a completed question/answer turn, keeping the newest `max_messages`
    pub fn record_turn(&mut self, question: &str, answer: &str, max_messages: usize) {
        self.transcript.push_back(ChatMessage {
            role: Role::User,
            content: question.to_string(),
        });
        self.transcript.push_back(ChatMessage {
            role: Role::Assistant,
            content: answer.to_string(),
        });
        while self.transcript.len() > max_messages {
            self.transcript.pop_front();
        }
    }

    pub fn transcript(&self) -> impl Iterator<Item = &ChatMessage> {
        self.transcript.iter()
    }

    /// Reset history, topic, last query and transcript together
    pub fn clear(&mut self) {
        self.history.clear();
        self.last_query = None;
        self.current_topic = None;
        self.transcript.clear();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            topic: self.current_topic.clone(),
            last_query: self.last_query.clone(),
            history_length: self.history.len(),
            message_count: self.transcript.len(),
        }
    }
}
