// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OpenAI-shaped response types for POST /v1/embeddings

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One embedding record (`"object": "embedding"`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingObject {
    pub object: String,
    pub embedding: Value,
    /// Position of the text in the request
    pub index: usize,
}

impl EmbeddingObject {
    pub fn new(index: usize, embedding: Value) -> Self {
        Self {
            object: "embedding".to_string(),
            embedding,
            index,
        }
    }
}

/// Token usage; always zero since no token accounting is done.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub total_tokens: u64,
}

/// Response body for POST /v1/embeddings endpoint
///
/// # Example
/// ```json
/// {
///   "object": "list",
///   "data": [{"object": "embedding", "embedding": [0.01, ...], "index": 0}],
///   "model": "bge-m3",
///   "usage": {"prompt_tokens": 0, "total_tokens": 0}
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIEmbeddingResponse {
    pub object: String,
    pub data: Vec<EmbeddingObject>,
    pub model: String,
    pub usage: Usage,
}

impl OpenAIEmbeddingResponse {
    pub fn new(data: Vec<EmbeddingObject>, model: String) -> Self {
        Self {
            object: "list".to_string(),
            data,
            model,
            usage: Usage::default(),
        }
    }
}
