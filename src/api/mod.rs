// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod http_server;
pub mod json_safe;
pub mod openai;

pub use embed::{embed_handler, EmbedResponse, EmbeddingRequest};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use json_safe::ToJsonSafe;
pub use openai::{openai_embeddings_handler, OpenAIEmbeddingRequest, OpenAIEmbeddingResponse};
