// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Parsing follow-up question suggestions

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Suggestions returned per request
pub const MAX_RELATED: usize = 5;

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+[.)]|[-*•])\s*").expect("list marker pattern is valid"))
}

/// Parse a model reply into at most five questions
///
/// A JSON array is taken as-is (string items only). A reply that is not
/// JSON falls back to picking question-like lines out of the text.
pub fn parse_related_questions(reply: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(reply.trim()) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .take(MAX_RELATED)
            .collect(),
        Ok(_) => Vec::new(),
        Err(_) => extract_questions_from_text(reply)
            .into_iter()
            .take(MAX_RELATED)
            .collect(),
    }
}

/// Lines that look like questions, with list markers and quotes removed
pub fn extract_questions_from_text(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = list_marker().replace(line.trim(), "");
            let line = line.trim_matches(|c: char| c == '"' || c == '\'' || c == ',').trim();
            let chars = line.chars().count();
            (chars > 10 && chars < 100 && line.contains('?')).then(|| line.to_string())
        })
        .collect()
}
