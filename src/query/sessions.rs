// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversation sessions keyed by id
//!
//! Each session has its own lock. A turn holds it for its full duration, so
//! requests within one session are serialised while different sessions run
//! independently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use super::state::{ConversationState, SessionSummary};

pub type SessionHandle = Arc<Mutex<ConversationState>>;

pub struct ConversationStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    max_context_messages: usize,
}

impl ConversationStore {
    /// Create a store whose transcripts keep at most `max_context_messages`
    pub fn new(max_context_messages: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_context_messages,
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn max_context_messages(&self) -> usize {
        self.max_context_messages
    }

    /// Handle for `id`, creating a fresh session on first use
    pub async fn session(&self, id: &str) -> SessionHandle {
        if let Some(existing) = self.sessions.read().await.get(id) {
            return Arc::clone(existing);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ConversationState::new()))),
        )
    }

    /// Reset a session; returns false if it does not exist
    pub async fn clear(&self, id: &str) -> bool {
        let handle = self.sessions.read().await.get(id).cloned();
        match handle {
            Some(handle) => {
                handle.lock().await.clear();
                info!("Conversation {} cleared", id);
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn summary(&self, id: &str) -> Option<SessionSummary> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        let summary = handle.lock().await.summary();
        Some(summary)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(20)
    }
}
