// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::debug;

use crate::ask::AskPipeline;
use crate::cache::CacheManager;
use crate::config::AtlasConfig;

/// Atlas RAG command line
#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(version)]
#[command(about = "Answer questions from live web sources with cited summaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question, with no conversation context
    Ask(commands::AskArgs),

    /// Start an interactive conversation
    Chat(commands::ChatArgs),

    /// Suggest follow-up questions
    Related(commands::RelatedArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli, config: AtlasConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;

    let cache = Arc::new(CacheManager::new(&config.cache));
    let pipeline = AskPipeline::new(&config, Arc::clone(&cache))?;
    let purge_task = cache.spawn_purge_task();

    let result = match cli.command {
        Commands::Ask(args) => commands::ask(&pipeline, args).await,
        Commands::Chat(args) => commands::chat(&pipeline, args).await,
        Commands::Related(args) => commands::related(&pipeline, args).await,
    };

    cache.shutdown();
    if let Err(e) = purge_task.await {
        debug!("Cache purge task ended abnormally: {}", e);
    }
    result
}
