// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every option can be given as a flag or an environment variable; a `.env`
//! file is loaded before parsing.

use crate::embeddings::{EmbeddingModelConfig, ModelSource};
use anyhow::{anyhow, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// BGE-M3 embedding service
#[derive(Parser, Debug, Clone)]
#[command(name = "bge-m3-service")]
#[command(about = "Serves BGE-M3 dense, sparse and colbert embeddings over HTTP", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "BGE_M3_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "BGE_M3_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Local directory holding model.onnx and tokenizer.json
    #[arg(long, env = "BGE_M3_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Hugging Face repo to download from when no model dir is given
    #[arg(long, env = "BGE_M3_HF_REPO", default_value = "aapot/bge-m3-onnx")]
    pub hf_repo: String,

    /// Model name used in logs
    #[arg(long, env = "BGE_M3_MODEL_NAME", default_value = "BAAI/bge-m3")]
    pub model_name: String,

    /// Tokenizer truncation length
    #[arg(long, env = "BGE_M3_MAX_LENGTH", default_value_t = 8192)]
    pub max_length: usize,

    /// Texts per inference call
    #[arg(long, env = "BGE_M3_BATCH_SIZE", default_value_t = 12)]
    pub batch_size: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "BGE_M3_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(anyhow!("max_length must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }
        if self.intra_threads == 0 {
            return Err(anyhow!("intra_threads must be greater than 0"));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow!("Invalid listen address {}:{}: {}", self.host, self.port, e))
    }

    pub fn model_source(&self) -> ModelSource {
        match &self.model_dir {
            Some(dir) => ModelSource::LocalDir(dir.clone()),
            None => ModelSource::HuggingFace(self.hf_repo.clone()),
        }
    }

    pub fn embedding_model_config(&self) -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            name: self.model_name.clone(),
            max_length: self.max_length,
            batch_size: self.batch_size,
            intra_threads: self.intra_threads,
        }
    }
}
