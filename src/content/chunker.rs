// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query-aware content chunking
//!
//! Splits long page text into paragraph/sentence chunks, scores them against
//! the query and reassembles the best ones in their original order so the
//! result reads coherently.

use regex::Regex;
use std::sync::OnceLock;

use crate::search::ranker::query_words;

/// Chunk size used when condensing a page for a prompt
pub const SMART_CHUNK_SIZE: usize = 400;

/// Chunks at or below this many characters are discarded
const MIN_CHUNK_CHARS: usize = 20;

/// Chunks shorter than this have their score halved
const SHORT_CHUNK_CHARS: usize = 50;

/// Ranking weight given to earlier chunks
const POSITION_WEIGHT: f64 = 0.5;

/// Boilerplate phrases removed by [`clean_text`]
const BOILERPLATE_PATTERN: &str =
    r"(?i)cookie policy|privacy policy|terms of service|sign up for our newsletter";

/// A scored piece of page text
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub score: f64,
    /// Position in the source text
    pub index: usize,
}

impl Chunk {
    /// Score plus a bonus that favours chunks near the start
    fn ranking_score(&self, total: usize) -> f64 {
        self.score + total.saturating_sub(self.index) as f64 * POSITION_WEIGHT
    }
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"))
}

fn horizontal_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\S\n]+").expect("whitespace pattern is valid"))
}

fn space_around_newline() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?\n ?").expect("newline pattern is valid"))
}

fn excess_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("newline run pattern is valid"))
}

fn boilerplate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BOILERPLATE_PATTERN).expect("boilerplate pattern is valid"))
}

/// Split text into chunks of at most `max_chunk_size` bytes
///
/// Paragraphs (blank-line separated) are kept whole when they fit; longer
/// ones are packed sentence by sentence, and sentences that still do not fit
/// are packed word by word.
pub fn split_into_chunks(text: &str, max_chunk_size: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let max = max_chunk_size.max(1);
    let normalized = text.replace("\r\n", "\n");

    let mut chunks = Vec::new();
    for paragraph in paragraph_break().split(&normalized) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if paragraph.len() <= max {
            chunks.push(paragraph.to_string());
        } else {
            chunks.extend(pack_sentences(paragraph, max));
        }
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| chunk.chars().count() > MIN_CHUNK_CHARS)
        .collect()
}

/// Split a paragraph after runs of `.`, `!` or `?` followed by whitespace
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !matches!(next, '.' | '!' | '?') {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

fn pack_sentences(paragraph: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(paragraph) {
        if sentence.len() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(pack_words(sentence, max));
            continue;
        }
        append_or_flush(&mut chunks, &mut current, sentence, max);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn pack_words(sentence: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        if word.len() > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_long_word(word, max));
            continue;
        }
        append_or_flush(&mut chunks, &mut current, word, max);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Append `piece` to `current` with a space, flushing first if it would overflow
fn append_or_flush(chunks: &mut Vec<String>, current: &mut String, piece: &str, max: usize) {
    let needed = if current.is_empty() {
        piece.len()
    } else {
        current.len() + 1 + piece.len()
    };
    if needed > max && !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
    if !current.is_empty() {
        current.push(' ');
    }
    current.push_str(piece);
}

fn split_long_word(word: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        if current.len() + c.len_utf8() > max && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Relevance of a chunk to the query
///
/// An exact phrase match scores 20. Otherwise each distinct query word
/// present scores 3 for its first occurrence and 1 for each repeat.
/// Chunks under 50 characters have their score halved.
pub fn score_chunk(chunk: &str, query: &str) -> f64 {
    let chunk_lower = chunk.to_lowercase();
    let phrase = query.trim().to_lowercase();
    let mut score = 0.0;

    if !phrase.is_empty() && chunk_lower.contains(&phrase) {
        score += 20.0;
    } else {
        for word in query_words(query) {
            let occurrences = chunk_lower.matches(word.as_str()).count();
            if occurrences > 0 {
                score += 3.0 + (occurrences - 1) as f64;
            }
        }
    }

    if chunk.chars().count() < SHORT_CHUNK_CHARS {
        score *= 0.5;
    }
    score
}

/// The `max_chunks` best chunks, returned in document order
pub fn select_relevant_chunks(
    text: &str,
    query: &str,
    max_chunks: usize,
    max_chunk_size: usize,
) -> Vec<Chunk> {
    let pieces = split_into_chunks(text, max_chunk_size);
    let total = pieces.len();

    let mut chunks: Vec<Chunk> = pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            score: score_chunk(&text, query),
            text,
            index,
        })
        .collect();

    // Stable: equal rankings keep document order
    chunks.sort_by(|a, b| b.ranking_score(total).total_cmp(&a.ranking_score(total)));
    chunks.truncate(max_chunks);
    chunks.sort_by_key(|chunk| chunk.index);
    chunks
}

/// Best chunks joined by blank lines in document order
pub fn extract_relevant_chunks(
    text: &str,
    query: &str,
    max_chunks: usize,
    max_chunk_size: usize,
) -> String {
    select_relevant_chunks(text, query, max_chunks, max_chunk_size)
        .into_iter()
        .map(|chunk| chunk.text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Condense `content` to at most `max_length` bytes, keeping query-relevant parts
///
/// Content that already fits is returned unchanged.
pub fn extract_smart_content(content: &str, query: &str, max_length: usize) -> String {
    if content.len() <= max_length {
        return content.to_string();
    }
    let max_chunks = max_length.div_ceil(SMART_CHUNK_SIZE).max(1);
    let chunk_size = SMART_CHUNK_SIZE.min(max_length.max(1));
    let extracted = extract_relevant_chunks(content, query, max_chunks, chunk_size);
    truncate_at_word(&extracted, max_length)
}

/// Normalise whitespace and strip boilerplate phrases
///
/// Horizontal whitespace collapses to one space and runs of blank lines
/// collapse to a single blank line, so paragraph structure survives.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = boilerplate().replace_all(&text, "");
    let text = horizontal_space().replace_all(&text, " ");
    let text = space_around_newline().replace_all(&text, "\n");
    let text = excess_newlines().replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Truncate to at most `max_len` bytes, preferring the last word boundary
pub fn truncate_at_word(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let prefix = &text[..cut];
    match prefix.rfind(char::is_whitespace) {
        Some(space) if space > 0 => prefix[..space].trim_end().to_string(),
        _ => prefix.to_string(),
    }
}
