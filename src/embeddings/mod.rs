// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! BGE-M3 Model Gateway
//!
//! The gateway is the single capability the HTTP layer depends on: it takes
//! a batch of texts plus a set of output flags and returns the requested
//! representations (dense, lexical weights, colbert multi-vectors).
//!
//! - `ModelGateway`: the injectable trait (real model or test stub)
//! - `EncodeFlags`: flag builder sent with every `encode` call
//! - `EncodeOutput`: keyed-or-bare result returned by `encode`
//! - `BgeM3OnnxModel`: ONNX Runtime implementation of the gateway

pub mod flags;
pub mod model_manager;
pub mod onnx_model;
pub mod output;

use anyhow::Result;
use async_trait::async_trait;

pub use flags::{EncodeFlags, RETURN_COLBERT, RETURN_DENSE, RETURN_SPARSE};
pub use model_manager::{load_gateway, EmbeddingModelConfig, ModelFiles, ModelSource};
pub use onnx_model::BgeM3OnnxModel;
pub use output::{EncodeOutput, Representation, COLBERT_VECS, DENSE_VECS, LEXICAL_WEIGHTS};

/// Text-embedding capability shared by every request handler.
///
/// Implementations must be safe to call concurrently; the HTTP layer does no
/// locking or queuing of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Encodes `texts` into the representations selected by `flags`.
    ///
    /// The returned output holds one entry per input text, in input order.
    async fn encode(&self, texts: &[String], flags: &EncodeFlags) -> Result<EncodeOutput>;
}
