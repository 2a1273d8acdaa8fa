// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedResponse, EmbeddingRequest};
use crate::api::http_server::AppState;
use crate::api::json_safe::ToJsonSafe;
use crate::api::errors::parse_json_body;
use crate::api::ApiError;
use crate::embeddings::ModelGateway;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Validates the request, runs the gateway, and converts its output.
///
/// An empty `texts` list is rejected without calling the gateway. Gateway
/// errors become `ApiError::UpstreamModelFailure` with the original message.
pub async fn embed(
    gateway: &dyn ModelGateway,
    request: EmbeddingRequest,
) -> Result<EmbedResponse, ApiError> {
    info!("Received request for {} texts", request.texts.len());
    request.validate()?;

    let flags = request.encode_flags();
    debug!(?flags, "Start encoding");

    let output = gateway
        .encode(&request.texts, &flags)
        .await
        .map_err(|e| {
            error!("Error: {:#}", e);
            ApiError::upstream(&e)
        })?;
    info!("Encoding finished");

    Ok(EmbedResponse {
        embeddings: output.to_json_safe(),
    })
}

/// POST /embed handler
///
/// # Request Body
/// ```json
/// {"texts": ["hello world", "test"], "return_dense": true}
/// ```
///
/// # Response Body
/// ```json
/// {"embeddings": {"dense_vecs": [[...], [...]], "lexical_weights": null, "colbert_vecs": null}}
/// ```
pub async fn embed_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let request: EmbeddingRequest = parse_json_body(&body?)?;
    embed(state.gateway.as_ref(), request).await.map(Json)
}
