// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page content acquisition and condensation
//!
//! Fetches pages (with retry, block detection and bounded concurrency),
//! extracts their main text and condenses it into query-relevant chunks.

pub mod chunker;
pub mod config;
pub mod extractor;
pub mod scraper;
pub mod transport;

pub use chunker::{
    clean_text, extract_relevant_chunks, extract_smart_content, score_chunk, split_into_chunks,
    Chunk,
};
pub use config::ScrapeConfig;
pub use extractor::extract_main_content;
pub use scraper::{check_url, ScrapeError, ScrapeOutcome, Scraper};
pub use transport::{HttpTransport, PageResponse, PageTransport};
