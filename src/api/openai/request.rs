// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OpenAIEmbeddingRequest type for POST /v1/embeddings endpoint

use serde::{Deserialize, Serialize};

pub const EMPTY_INPUT_MESSAGE: &str = "Input cannot be empty.";

/// `input` accepts a bare string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl EmbeddingInput {
    /// A bare string becomes a one-element list.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            EmbeddingInput::Single(text) => vec![text],
            EmbeddingInput::Batch(texts) => texts,
        }
    }
}

/// Request body for POST /v1/embeddings endpoint
///
/// `model` is not checked against anything; it is echoed in the response.
///
/// # Example
/// ```json
/// {"input": ["hello world", "test"], "model": "bge-m3"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIEmbeddingRequest {
    pub input: EmbeddingInput,

    /// Default: "BAAI/bge-m3"
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "BAAI/bge-m3".to_string()
}
