// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings HTTP handler

use crate::api::http_server::AppState;
use crate::api::json_safe::ToJsonSafe;
use crate::api::openai::request::EMPTY_INPUT_MESSAGE;
use crate::api::openai::{EmbeddingObject, OpenAIEmbeddingRequest, OpenAIEmbeddingResponse};
use crate::api::errors::parse_json_body;
use crate::api::ApiError;
use crate::embeddings::{EncodeFlags, ModelGateway};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

/// Dense-only encode in OpenAI response format.
///
/// The gateway is asked for dense vectors with sparse disabled, and the
/// colbert flag is never sent. Both keyed and bare gateway results are
/// accepted.
pub async fn create_embeddings(
    gateway: &dyn ModelGateway,
    request: OpenAIEmbeddingRequest,
) -> Result<OpenAIEmbeddingResponse, ApiError> {
    let model = request.model;
    let texts = request.input.into_texts();
    info!(
        "Received OpenAI embedding request. Model: {}, Input length: {}",
        model,
        texts.len()
    );

    if texts.is_empty() {
        return Err(ApiError::InvalidInput(EMPTY_INPUT_MESSAGE.to_string()));
    }

    let flags = EncodeFlags::new().dense(true).sparse(false);
    let dense = gateway
        .encode(&texts, &flags)
        .await
        .and_then(|output| output.into_dense())
        .map_err(|e| {
            error!("Error: {:#}", e);
            ApiError::upstream(&e)
        })?;

    if let Some(first) = dense.rows().into_iter().next() {
        info!("Generated vector dimension: {}", first.len());
    }

    let data = dense
        .rows()
        .into_iter()
        .enumerate()
        .map(|(index, vector)| EmbeddingObject::new(index, vector.to_json_safe()))
        .collect();

    Ok(OpenAIEmbeddingResponse::new(data, model))
}

/// POST /v1/embeddings handler
pub async fn openai_embeddings_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<OpenAIEmbeddingResponse>, ApiError> {
    let request: OpenAIEmbeddingRequest = parse_json_body(&body?)?;
    create_embeddings(state.gateway.as_ref(), request)
        .await
        .map(Json)
}
