// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/embeddings through the full router

use super::stub_gateway::{app_with, send, send_untyped, StubGateway};
use axum::http::StatusCode;
use bge_m3_service::embeddings::{RETURN_COLBERT, RETURN_DENSE, RETURN_SPARSE};
use serde_json::json;

#[tokio::test]
async fn test_single_string_input() {
    let gateway = StubGateway::keyed();
    let (status, body) = send(
        app_with(gateway.clone()),
        "POST",
        "/v1/embeddings",
        Some(r#"{"input": "hello", "model": "bge-m3"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "object": "list",
            "data": [{"object": "embedding", "embedding": [0.0, 0.5], "index": 0}],
            "model": "bge-m3",
            "usage": {"prompt_tokens": 0, "total_tokens": 0}
        })
    );

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, vec!["hello".to_string()]);
    let flags = &calls[0].1;
    assert_eq!(flags.get(RETURN_DENSE), Some(true));
    assert_eq!(flags.get(RETURN_SPARSE), Some(false));
    assert!(!flags.contains(RETURN_COLBERT));
}

#[tokio::test]
async fn test_list_input_indexes_and_default_model() {
    let (status, body) = send(
        app_with(StubGateway::keyed()),
        "POST",
        "/v1/embeddings",
        Some(r#"{"input": ["a", "b", "c"]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "BAAI/bge-m3");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    for (i, record) in data.iter().enumerate() {
        assert_eq!(record["index"], json!(i));
        assert_eq!(record["object"], "embedding");
        assert_eq!(record["embedding"][0], json!(i as f64));
    }
}

#[tokio::test]
async fn test_large_batch_without_content_type() {
    let gateway = StubGateway::keyed();
    let input: Vec<String> = (0..300).map(|_| "y".repeat(8000)).collect();
    let payload = json!({ "input": input }).to_string();
    assert!(payload.len() > 2 * 1024 * 1024);

    let (status, body) = send_untyped(app_with(gateway.clone()), "/v1/embeddings", payload).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 300);
    assert_eq!(data[299]["index"], json!(299));
}

#[tokio::test]
async fn test_bare_gateway_result_accepted() {
    let (status, body) = send(
        app_with(StubGateway::bare()),
        "POST",
        "/v1/embeddings",
        Some(r#"{"input": ["x", "y"]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][1]["embedding"], json!([1.0, 0.5]));
}

#[tokio::test]
async fn test_empty_list_rejected_before_model() {
    let gateway = StubGateway::keyed();
    let (status, body) = send(
        app_with(gateway.clone()),
        "POST",
        "/v1/embeddings",
        Some(r#"{"input": []}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Input cannot be empty."}));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_input_type_is_422() {
    let gateway = StubGateway::keyed();
    let (status, body) = send(
        app_with(gateway.clone()),
        "POST",
        "/v1/embeddings",
        Some(r#"{"input": 42}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_model_failure_is_500_and_service_recovers() {
    let gateway = StubGateway::failing_once("tokenizer crashed");
    let app = app_with(gateway.clone());

    let (status, body) = send(app.clone(), "POST", "/v1/embeddings", Some(r#"{"input": "a"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "tokenizer crashed"}));

    let (status, _) = send(app, "POST", "/v1/embeddings", Some(r#"{"input": "a"}"#)).await;
    assert_eq!(status, StatusCode::OK);
}
