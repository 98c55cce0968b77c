// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversational query handling

pub mod analyzer;
pub mod sessions;
pub mod state;

pub use analyzer::{QueryAnalysis, QueryAnalyzer};
pub use sessions::{ConversationStore, SessionHandle};
pub use state::{ChatMessage, ConversationState, Role, SessionSummary, MAX_HISTORY};
