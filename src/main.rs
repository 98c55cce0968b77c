// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use atlas_rag::{
    cli::{execute, Cli},
    config::AtlasConfig,
    version,
};
use clap::Parser;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging; stdout is reserved for answers
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    eprintln!("🔎 {}", version::get_version_string());
    eprintln!("📦 BUILD VERSION: {}", version::VERSION);

    let config = AtlasConfig::from_env();

    match execute(cli, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}
