// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Recording gateway used by the HTTP tests
//!
//! Produces deterministic vectors: row `i` of the dense matrix is `[i, 0.5]`,
//! so ordering is visible in responses.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bge_m3_service::api::{create_app, AppState};
use bge_m3_service::embeddings::{
    EncodeFlags, EncodeOutput, ModelGateway, Representation, COLBERT_VECS, DENSE_VECS,
    LEXICAL_WEIGHTS,
};
use ndarray::Array2;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for `oneshot`

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputShape {
    Keyed,
    Bare,
}

pub struct StubGateway {
    shape: OutputShape,
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<(Vec<String>, EncodeFlags)>>,
}

impl StubGateway {
    pub fn keyed() -> Arc<Self> {
        Arc::new(Self::with_shape(OutputShape::Keyed))
    }

    pub fn bare() -> Arc<Self> {
        Arc::new(Self::with_shape(OutputShape::Bare))
    }

    /// Fails the first call with `message`, then behaves like `keyed()`.
    pub fn failing_once(message: &str) -> Arc<Self> {
        let stub = Self::with_shape(OutputShape::Keyed);
        *stub.failure.lock().unwrap() = Some(message.to_string());
        Arc::new(stub)
    }

    fn with_shape(shape: OutputShape) -> Self {
        Self {
            shape,
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, EncodeFlags)> {
        self.calls.lock().unwrap().clone()
    }
}

fn dense_rows(count: usize) -> Array2<f32> {
    Array2::from_shape_fn((count, 2), |(i, j)| if j == 0 { i as f32 } else { 0.5 })
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn encode(&self, texts: &[String], flags: &EncodeFlags) -> Result<EncodeOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((texts.to_vec(), flags.clone()));

        if let Some(message) = self.failure.lock().unwrap().take() {
            return Err(anyhow!(message));
        }

        if self.shape == OutputShape::Bare {
            return Ok(EncodeOutput::Bare(dense_rows(texts.len())));
        }

        let mut kinds = BTreeMap::new();
        let dense = if flags.wants_dense() {
            Representation::Dense(dense_rows(texts.len()))
        } else {
            Representation::NotRequested
        };
        let lexical = if flags.wants_sparse() {
            Representation::Lexical(
                (0..texts.len())
                    .map(|i| HashMap::from([(i.to_string(), 0.25f32)]))
                    .collect(),
            )
        } else {
            Representation::NotRequested
        };
        let colbert = if flags.wants_colbert() {
            Representation::MultiVector(vec![Array2::from_elem((1, 2), 1.0); texts.len()])
        } else {
            Representation::NotRequested
        };
        kinds.insert(DENSE_VECS.to_string(), dense);
        kinds.insert(LEXICAL_WEIGHTS.to_string(), lexical);
        kinds.insert(COLBERT_VECS.to_string(), colbert);
        Ok(EncodeOutput::Keyed(kinds))
    }
}

pub fn app_with(gateway: Arc<StubGateway>) -> Router {
    create_app(Arc::new(AppState::new(gateway)))
}

/// Sends a request through the router and returns status plus parsed body.
pub async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    dispatch(app, request).await
}

/// Like `send`, but posts `body` with no `Content-Type` header.
pub async fn send_untyped(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body))
        .unwrap();
    dispatch(app, request).await
}

async fn dispatch(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
