// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question answering orchestration

pub mod errors;
pub mod pipeline;
pub mod related;

pub use errors::{AskError, MIN_QUESTION_CHARS};
pub use pipeline::{AskPipeline, AskResponse, AskStream};
pub use related::parse_related_questions;
