// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML main-content extraction
//!
//! Finds the element most likely to hold the article body and returns its
//! visible text with paragraph breaks preserved.

use scraper::{ElementRef, Html, Node, Selector};

use super::chunker::truncate_at_word;

/// Selectors tried in priority order before falling back to `<body>`
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".story-body",
    ".article__body",
    ".content-body",
    "#article-body",
    "#content",
    ".prose",
];

/// Elements whose text never belongs to the article
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg", "iframe",
    "template",
];

/// Elements that start a new paragraph
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "blockquote", "pre", "table", "tr", "br", "dd", "dt", "figcaption",
];

/// A candidate must carry at least this much text to beat the body fallback
const MIN_CANDIDATE_CHARS: usize = 200;

/// Extract the main textual content of an HTML page
///
/// Returns an empty string when the page has no visible text. Output is
/// truncated to `max_chars` bytes at a word boundary.
pub fn extract_main_content(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = normalize_whitespace(&collect_text(element));
            if text.len() > MIN_CANDIDATE_CHARS {
                return truncate_at_word(&text, max_chars);
            }
        }
    }

    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    match document.select(&body_selector).next() {
        Some(body) => truncate_at_word(&normalize_whitespace(&collect_text(body)), max_chars),
        None => String::new(),
    }
}

/// Visible text under `element`, with a paragraph break before each block
fn collect_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map_or(false, |el| NOISE_TAGS.contains(&el.name()))
                });
                if !hidden {
                    out.push_str(text);
                    out.push(' ');
                }
            }
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push_str("\n\n"),
            _ => {}
        }
    }
    out
}

/// Collapse whitespace inside paragraphs and drop empty ones
fn normalize_whitespace(text: &str) -> String {
    text.split("\n\n")
        .map(|block| block.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
