// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX BGE-M3 Model Wrapper
//!
//! This module wraps ONNX Runtime to run a three-head BGE-M3 export whose
//! graph emits `dense_vecs`, `sparse_vecs` and `colbert_vecs`.
//!
//! Features:
//! - ONNX model loading from disk
//! - XLM-RoBERTa tokenization with truncation to `max_length`
//! - Fixed-size chunking of large requests (`batch_size`)
//! - Dense vectors (L2 normalized, one per text)
//! - Lexical weights (token id -> max weight, special tokens skipped)
//! - Colbert vectors (one L2 normalized row per non-CLS token)

use crate::embeddings::{
    EmbeddingModelConfig, EncodeFlags, EncodeOutput, ModelFiles, ModelGateway, Representation,
    COLBERT_VECS, DENSE_VECS, LEXICAL_WEIGHTS,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{s, Array2, Array3, ArrayD, ArrayViewMut1, Ix2, Ix3};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

const SPARSE_VECS: &str = "sparse_vecs";

/// Special tokens of the XLM-RoBERTa vocabulary that never carry lexical weight
const SPECIAL_TOKENS: [&str; 4] = ["<s>", "</s>", "<pad>", "<unk>"];

/// ONNX-based BGE-M3 embedding model
///
/// # Thread Safety
/// The session sits behind `Arc<Mutex>`; concurrent `encode` calls are
/// serialized at inference time. Cloning is cheap.
#[derive(Clone)]
pub struct BgeM3OnnxModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
    pad_id: u32,
    special_ids: Arc<HashSet<u32>>,
}

impl std::fmt::Debug for BgeM3OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgeM3OnnxModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

/// Raw per-batch model output before flag filtering
#[derive(Debug)]
struct BatchOutput {
    dense: Array2<f32>,
    lexical: Vec<HashMap<String, f32>>,
    colbert: Vec<Array2<f32>>,
}

impl BgeM3OnnxModel {
    /// Loads the ONNX graph and tokenizer and runs a validation inference.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The graph does not expose the three BGE-M3 output heads
    ///
    /// Blocking: call from a blocking context (see `load_gateway`).
    pub fn load(config: &EmbeddingModelConfig, files: &ModelFiles) -> Result<Self> {
        let model_path = files.model_path.as_path();
        let tokenizer_path = files.tokenizer_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Initializing ONNX session for {}", config.name);
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        // Batches are padded by hand below.
        tokenizer.with_padding(None);

        let special_ids: HashSet<u32> = SPECIAL_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();
        let pad_id = tokenizer.token_to_id("<pad>").unwrap_or(1);

        let mut model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name: config.name.clone(),
            dimension: 0,
            batch_size: config.batch_size,
            pad_id,
            special_ids: Arc::new(special_ids),
        };

        let validation = model
            .infer_batch(&["validation test".to_string()])
            .context("Validation inference failed")?;
        model.dimension = validation.dense.ncols();
        if model.dimension == 0 {
            anyhow::bail!("Model produced empty dense vectors");
        }

        info!(
            "✅ BGE-M3 model loaded: {} ({} dimensions)",
            model.model_name, model.dimension
        );

        Ok(model)
    }

    /// Runs the full encode synchronously, chunking into `batch_size` groups.
    pub fn encode_blocking(&self, texts: &[String], flags: &EncodeFlags) -> Result<EncodeOutput> {
        encode_chunked(texts, self.batch_size, self.dimension, flags, |chunk| {
            self.infer_batch(chunk)
        })
    }

    fn infer_batch(&self, texts: &[String]) -> Result<BatchOutput> {
        let tokenized = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map(|enc| TokenizedText {
                        ids: enc.get_ids().to_vec(),
                        attention_mask: enc.get_attention_mask().to_vec(),
                    })
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let (input_ids_array, attention_mask_array) = pad_inputs(&tokenized, self.pad_id)?;
        let seq = input_ids_array.ncols();

        // Tensors are copied out so the session is released before post-processing.
        let (dense, sparse, colbert) = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids_array)?,
                "attention_mask" => Value::from_array(attention_mask_array)?
            ])?;

            let dense = outputs
                .get(DENSE_VECS)
                .with_context(|| format!("Model has no '{}' output", DENSE_VECS))?
                .try_extract_array::<f32>()
                .context("Failed to extract dense_vecs tensor")?
                .into_dimensionality::<Ix2>()
                .context("dense_vecs must be [batch, hidden]")?
                .to_owned();
            let sparse = outputs
                .get(SPARSE_VECS)
                .with_context(|| format!("Model has no '{}' output", SPARSE_VECS))?
                .try_extract_array::<f32>()
                .context("Failed to extract sparse_vecs tensor")?
                .to_owned();
            let colbert = outputs
                .get(COLBERT_VECS)
                .with_context(|| format!("Model has no '{}' output", COLBERT_VECS))?
                .try_extract_array::<f32>()
                .context("Failed to extract colbert_vecs tensor")?
                .into_dimensionality::<Ix3>()
                .context("colbert_vecs must be [batch, seq - 1, hidden]")?
                .to_owned();
            (dense, sparse, colbert)
        };

        debug!(
            batch = texts.len(),
            seq,
            hidden = dense.ncols(),
            "ONNX batch inference finished"
        );

        assemble_batch(&tokenized, dense, sparse, colbert, &self.special_ids)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl ModelGateway for BgeM3OnnxModel {
    async fn encode(&self, texts: &[String], flags: &EncodeFlags) -> Result<EncodeOutput> {
        let model = self.clone();
        let texts = texts.to_vec();
        let flags = flags.clone();

        tokio::task::spawn_blocking(move || model.encode_blocking(&texts, &flags))
            .await
            .map_err(|e| anyhow!("Embedding task failed: {}", e))?
    }
}

/// Token ids and attention mask of one text, unpadded
struct TokenizedText {
    ids: Vec<u32>,
    attention_mask: Vec<u32>,
}

/// Pads every text to the longest in the batch. Returns `(input_ids, attention_mask)`.
fn pad_inputs(texts: &[TokenizedText], pad_id: u32) -> Result<(Array2<i64>, Array2<i64>)> {
    let max_len = texts.iter().map(|t| t.ids.len()).max().unwrap_or(0);

    let mut input_ids = Vec::with_capacity(texts.len() * max_len);
    let mut attention_mask = Vec::with_capacity(texts.len() * max_len);
    for text in texts {
        let padding = max_len - text.ids.len();
        input_ids.extend(text.ids.iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat(pad_id as i64).take(padding));
        attention_mask.extend(text.attention_mask.iter().map(|&m| m as i64));
        attention_mask.extend(std::iter::repeat(0i64).take(padding));
    }

    let input_ids = Array2::from_shape_vec((texts.len(), max_len), input_ids)
        .context("Failed to create batch input_ids array")?;
    let attention_mask = Array2::from_shape_vec((texts.len(), max_len), attention_mask)
        .context("Failed to create batch attention_mask array")?;
    Ok((input_ids, attention_mask))
}

/// Turns the raw heads of one batch into per-text representations.
///
/// `sparse` may be `[batch, seq]` or `[batch, seq, 1]`. Colbert rows beyond
/// each text's own token count (padding) are dropped.
fn assemble_batch(
    texts: &[TokenizedText],
    mut dense: Array2<f32>,
    sparse: ArrayD<f32>,
    colbert: Array3<f32>,
    special_ids: &HashSet<u32>,
) -> Result<BatchOutput> {
    let batch = texts.len();
    if dense.nrows() != batch {
        anyhow::bail!("dense_vecs has {} rows for {} texts", dense.nrows(), batch);
    }
    if colbert.shape()[0] != batch {
        anyhow::bail!("colbert_vecs has unexpected shape {:?}", colbert.shape());
    }
    let sparse_ok = sparse.shape().first() == Some(&batch)
        && (sparse.ndim() == 2 || (sparse.ndim() == 3 && sparse.shape()[2] == 1));
    if !sparse_ok {
        anyhow::bail!("sparse_vecs has unexpected shape {:?}", sparse.shape());
    }
    let sparse_seq = sparse.shape()[1];
    let sparse_values: Vec<f32> = sparse.iter().copied().collect();

    for row in dense.rows_mut() {
        l2_normalize(row);
    }

    let mut lexical = Vec::with_capacity(batch);
    let mut multi = Vec::with_capacity(batch);
    for (i, text) in texts.iter().enumerate() {
        let row = &sparse_values[i * sparse_seq..(i + 1) * sparse_seq];
        lexical.push(collect_lexical_weights(&text.ids, row, special_ids));

        let token_count: usize = text.attention_mask.iter().map(|&m| m as usize).sum();
        let rows = colbert_row_count(token_count, colbert.shape()[1]);
        let mut vectors = colbert.slice(s![i, ..rows, ..]).to_owned();
        for row in vectors.rows_mut() {
            l2_normalize(row);
        }
        multi.push(vectors);
    }

    Ok(BatchOutput {
        dense,
        lexical,
        colbert: multi,
    })
}

/// Runs `infer` over `batch_size` chunks and stitches the results in input order.
fn encode_chunked<F>(
    texts: &[String],
    batch_size: usize,
    dimension: usize,
    flags: &EncodeFlags,
    mut infer: F,
) -> Result<EncodeOutput>
where
    F: FnMut(&[String]) -> Result<BatchOutput>,
{
    let mut dense_rows: Vec<f32> = Vec::with_capacity(texts.len() * dimension);
    let mut lexical = Vec::with_capacity(texts.len());
    let mut colbert = Vec::with_capacity(texts.len());

    for chunk in texts.chunks(batch_size.max(1)) {
        let batch = infer(chunk)?;
        if batch.dense.ncols() != dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                batch.dense.ncols(),
                dimension
            );
        }
        dense_rows.extend(batch.dense.iter().copied());
        lexical.extend(batch.lexical);
        colbert.extend(batch.colbert);
    }

    let dense = Array2::from_shape_vec((texts.len(), dimension), dense_rows)
        .context("Failed to assemble dense matrix")?;

    let mut kinds = BTreeMap::new();
    kinds.insert(
        DENSE_VECS.to_string(),
        if flags.wants_dense() {
            Representation::Dense(dense)
        } else {
            Representation::NotRequested
        },
    );
    kinds.insert(
        LEXICAL_WEIGHTS.to_string(),
        if flags.wants_sparse() {
            Representation::Lexical(lexical)
        } else {
            Representation::NotRequested
        },
    );
    kinds.insert(
        COLBERT_VECS.to_string(),
        if flags.wants_colbert() {
            Representation::MultiVector(colbert)
        } else {
            Representation::NotRequested
        },
    );

    Ok(EncodeOutput::Keyed(kinds))
}

/// Keeps the largest positive weight per token id, skipping special tokens.
fn collect_lexical_weights(
    ids: &[u32],
    weights: &[f32],
    skip: &HashSet<u32>,
) -> HashMap<String, f32> {
    let mut result: HashMap<String, f32> = HashMap::new();
    for (&id, &weight) in ids.iter().zip(weights) {
        if skip.contains(&id) || weight <= 0.0 {
            continue;
        }
        let entry = result.entry(id.to_string()).or_insert(0.0);
        if weight > *entry {
            *entry = weight;
        }
    }
    result
}

/// Colbert rows for one text: every attended token except the leading CLS.
fn colbert_row_count(attended_tokens: usize, available: usize) -> usize {
    attended_tokens.saturating_sub(1).min(available)
}

fn l2_normalize(mut row: ArrayViewMut1<f32>) {
    let norm = row.dot(&row).sqrt();
    if norm > 0.0 {
        row.mapv_inplace(|v| v / norm);
    }
}
