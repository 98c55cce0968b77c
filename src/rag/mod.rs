// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval preparation
//!
//! Turns ranked search hits into bounded, citation-ready source blocks.

pub mod config;
pub mod format;
pub mod preparer;
pub mod types;

pub use config::PrepareConfig;
pub use format::{citation_lines, render_sources};
pub use preparer::SourcePreparer;
pub use types::{PreparedSource, SourceOrigin, SourceRef};
