// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use bge_m3_service::{
    api::{start_server, AppState},
    config::ServerConfig,
    embeddings::load_gateway,
    version,
};
use clap::Parser;
use std::{env, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // Tokenizer parallelism stays off unless set explicitly
    if env::var("TOKENIZERS_PARALLELISM").is_err() {
        env::set_var("TOKENIZERS_PARALLELISM", "false");
    }

    let config = ServerConfig::parse();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {:#}", e);
        std::process::exit(2);
    }

    info!("Initializing {}...", version::get_version_string());
    info!("Build: {}", version::VERSION);
    info!("Features: {}", version::FEATURES.join(", "));

    // The model is loaded before the listener exists; a failure here ends the
    // process without ever accepting a connection.
    let gateway = match load_gateway(config.embedding_model_config(), config.model_source())
        .await
    {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("CRITICAL ERROR loading model: {:#}", e);
            std::process::exit(1);
        }
    };

    let addr = config.listen_addr()?;
    info!("API Endpoints:");
    info!("  Health:       GET  http://{}/", addr);
    info!("  Embed:        POST http://{}/embed", addr);
    info!("  OpenAI:       POST http://{}/v1/embeddings", addr);

    start_server(addr, Arc::new(AppState::new(gateway))).await
}
