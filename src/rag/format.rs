// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rendering prepared sources for the answer prompt

use super::types::{PreparedSource, SourceRef};

/// Numbered source blocks separated by blank lines
///
/// Each block is `[n]\nTitle: ..\nSource: ..\n\n<content>`, numbered from 1
/// so the model's `[n]` citations line up with the source list.
pub fn render_sources(sources: &[PreparedSource]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "[{}]\nTitle: {}\nSource: {}\n\n{}",
                i + 1,
                source.title,
                source.url,
                source.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Citation lines `[n] Title - URL` for display after an answer
pub fn citation_lines(sources: &[SourceRef]) -> Vec<String> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| format!("[{}] {} - {}", i + 1, source.title, source.url))
        .collect()
}
