// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Native Embedding API Module
//!
//! This module provides the POST /embed endpoint returning any combination of
//! dense vectors, lexical weights and colbert vectors.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{embed, embed_handler};
pub use request::EmbeddingRequest;
pub use response::EmbedResponse;
