// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model startup
//!
//! Resolves the model files (local directory or Hugging Face Hub cache) and
//! loads the gateway once, before the HTTP listener is bound.

use crate::embeddings::{BgeM3OnnxModel, ModelGateway};
use anyhow::{Context, Result};
use hf_hub::api::sync::Api as HfApi;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const MODEL_FILE: &str = "model.onnx";
pub const MODEL_DATA_FILE: &str = "model.onnx_data";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Configuration for loading the embedding model
#[derive(Debug, Clone)]
pub struct EmbeddingModelConfig {
    /// Model name used in logs (e.g., "BAAI/bge-m3")
    pub name: String,
    /// Tokenizer truncation length
    pub max_length: usize,
    /// Texts per inference call
    pub batch_size: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for EmbeddingModelConfig {
    fn default() -> Self {
        Self {
            name: "BAAI/bge-m3".to_string(),
            max_length: 8192,
            batch_size: 12,
            intra_threads: 4,
        }
    }
}

/// Where the ONNX export comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    LocalDir(PathBuf),
    HuggingFace(String),
}

/// Resolved on-disk paths of the model files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelFiles {
    /// Expects `model.onnx` (plus optional `model.onnx_data`) and
    /// `tokenizer.json` side by side in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(MODEL_FILE),
            tokenizer_path: dir.join(TOKENIZER_FILE),
        }
    }

    /// Resolves files for `source`, downloading into the hf-hub cache if needed.
    ///
    /// Blocking: performs network I/O for `ModelSource::HuggingFace`.
    pub fn resolve(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::LocalDir(dir) => Ok(Self::from_dir(dir)),
            ModelSource::HuggingFace(repo_id) => {
                info!("Fetching {} from Hugging Face Hub", repo_id);
                let api = HfApi::new().context("Failed to initialize Hugging Face Hub client")?;
                let repo = api.model(repo_id.clone());

                let model_path = repo
                    .get(MODEL_FILE)
                    .with_context(|| format!("Failed to fetch {} from {}", MODEL_FILE, repo_id))?;
                // Exports above 2GB keep their weights in an external data file
                // that must sit next to model.onnx.
                if let Err(e) = repo.get(MODEL_DATA_FILE) {
                    warn!("No {} in {}: {}", MODEL_DATA_FILE, repo_id, e);
                }
                let tokenizer_path = repo.get(TOKENIZER_FILE).with_context(|| {
                    format!("Failed to fetch {} from {}", TOKENIZER_FILE, repo_id)
                })?;

                Ok(Self {
                    model_path,
                    tokenizer_path,
                })
            }
        }
    }
}

/// Loads the gateway used for the lifetime of the process.
///
/// Runs file resolution and model loading on the blocking pool. Any error is
/// meant to abort startup.
pub async fn load_gateway(
    config: EmbeddingModelConfig,
    source: ModelSource,
) -> Result<Arc<dyn ModelGateway>> {
    info!("Loading model {} from {:?}", config.name, source);

    let model = tokio::task::spawn_blocking(move || -> Result<BgeM3OnnxModel> {
        let files = ModelFiles::resolve(&source)?;
        BgeM3OnnxModel::load(&config, &files)
    })
    .await
    .context("Model loading task failed")??;

    info!("Model loaded successfully.");
    Ok(Arc::new(model))
}
