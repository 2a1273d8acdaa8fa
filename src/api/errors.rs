// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::error::Category;
use thiserror::Error;

/// Error body shared by every endpoint: `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Payload violates a precondition; rejected before the model is called
    #[error("{0}")]
    InvalidInput(String),
    /// Body could not be parsed into the request type
    #[error("{0}")]
    UnprocessableEntity(String),
    /// The model gateway failed during `encode`
    #[error("{0}")]
    UpstreamModelFailure(String),
    /// Body could not be read at all; carries the transport status
    #[error("{message}")]
    BodyRejected { status: u16, message: String },
    #[error("Not Found")]
    NotFound,
}

impl ApiError {
    /// Wraps a gateway error, forwarding its full message chain unchanged.
    pub fn upstream(err: &anyhow::Error) -> Self {
        ApiError::UpstreamModelFailure(format!("{:#}", err))
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound => 404,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::UpstreamModelFailure(_) => 500,
            ApiError::BodyRejected { status, .. } => *status,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::BodyRejected {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

/// Parses a request body as JSON regardless of its `Content-Type`.
///
/// Syntax and type errors become `UnprocessableEntity`.
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        let message = match e.classify() {
            Category::Data => {
                format!("Failed to deserialize the JSON body into the target type: {}", e)
            }
            Category::Syntax | Category::Eof | Category::Io => {
                format!("Failed to parse the request body as JSON: {}", e)
            }
        };
        ApiError::UnprocessableEntity(message)
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
