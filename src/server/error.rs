use std::fmt::Display;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure the API reports. The cause is logged, never sent to the client.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("The resource/s cannot be found")]
    NotFound,

    #[error("This operation cannot be done")]
    Unprocessable,

    #[error("This method is not allowed in this endpoint")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success_status": false,
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", rejection.body_text());
        ApiError::NotFound
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query: {}", rejection.body_text());
        ApiError::NotFound
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected body: {}", rejection.body_text());
        ApiError::Unprocessable
    }
}

/// Maps any failure at the handler boundary onto the two outcomes the API
/// distinguishes.
pub trait ResultExt<T> {
    fn or_not_found(self) -> Result<T, ApiError>;
    fn or_unprocessable(self) -> Result<T, ApiError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_not_found(self) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::info!(error = %e, "Responding with not found");
            ApiError::NotFound
        })
    }

    fn or_unprocessable(self) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, "Responding with unprocessable");
            ApiError::Unprocessable
        })
    }
}
