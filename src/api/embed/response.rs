// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body for POST /embed endpoint
///
/// `embeddings` is the gateway output converted to plain JSON, e.g.
/// ```json
/// {
///   "embeddings": {
///     "dense_vecs": [[0.01, -0.02, ...], ...],
///     "lexical_weights": null,
///     "colbert_vecs": null
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embeddings: Value,
}
