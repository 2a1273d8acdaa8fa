// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbeddingRequest type for POST /embed endpoint

use crate::api::ApiError;
use crate::embeddings::EncodeFlags;
use serde::{Deserialize, Serialize};

pub const EMPTY_TEXTS_MESSAGE: &str = "Input texts cannot be empty.";

/// Request body for POST /embed endpoint
///
/// # Example
/// ```json
/// {
///   "texts": ["hello world", "test"],
///   "return_dense": true,
///   "return_sparse": false,
///   "return_colbert": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRequest {
    /// Texts to embed, in output order
    pub texts: Vec<String>,

    /// Default: true
    #[serde(default = "default_true")]
    pub return_dense: bool,

    /// Default: false
    #[serde(default)]
    pub return_sparse: bool,

    /// Default: false
    #[serde(default)]
    pub return_colbert: bool,
}

fn default_true() -> bool {
    true
}

impl EmbeddingRequest {
    /// Rejects an empty `texts` list.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.texts.is_empty() {
            return Err(ApiError::InvalidInput(EMPTY_TEXTS_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Flags for the gateway; `return_colbert` is only sent when true.
    pub fn encode_flags(&self) -> EncodeFlags {
        EncodeFlags::new()
            .dense(self.return_dense)
            .sparse(self.return_sparse)
            .colbert(self.return_colbert)
    }
}
