// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OpenAI-compatible Embeddings API Module
//!
//! This module provides POST /v1/embeddings, returning dense vectors in the
//! OpenAI `list` / `embedding` object format.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{create_embeddings, openai_embeddings_handler};
pub use request::{EmbeddingInput, OpenAIEmbeddingRequest};
pub use response::{EmbeddingObject, OpenAIEmbeddingResponse, Usage};
