// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL caching for search results, scraped pages and model responses
//!
//! One [`CacheManager`] is constructed per process and injected into the
//! components that consult it. Keys are a class prefix plus a SHA-256 of the
//! normalized input, so logically identical inputs share an entry.

pub mod config;
pub mod manager;
pub mod store;

pub use config::CacheConfig;
pub use manager::{CacheClass, CacheManager, CacheStats, ClassStats};
pub use store::TtlStore;
