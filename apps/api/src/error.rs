//! Error handling for the Brewery API
//!
//! A single thiserror enum covers seed ingestion and request handling.
//! HTTP handlers return it through Axum's IntoResponse trait, and GraphQL
//! resolvers turn it into field errors carrying the same `code`.

use std::fmt::Display;
use std::path::Path;

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brewery_relation_loader::{LoadError, RepositoryError};
use serde::Serialize;
use thiserror::Error;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Availability ==========
    /// Service is up but cannot serve data yet
    #[error("service not ready: {0}")]
    NotReady(String),

    // ========== Data Errors ==========
    /// Seed file missing or malformed
    #[error("failed to ingest {file}: {reason}")]
    Ingestion { file: String, reason: String },

    /// Repository backend failed
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A batched relation load failed
    #[error("relation load failed: {0}")]
    Load(#[from] LoadError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 503 Service Unavailable
            Self::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 502 Bad Gateway (backing store failures)
            Self::Repository(_) | Self::Load(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Ingestion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "NOT_READY",
            Self::Ingestion { .. } => "INGESTION_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::Load(_) => "LOAD_ERROR",
        }
    }

    /// Create an ingestion error for a seed file
    pub fn ingestion(path: &Path, reason: impl Display) -> Self {
        Self::Ingestion {
            file: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
        })
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::not_ready(
        ApiError::NotReady("no data".to_string()),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[case::ingestion(
        ApiError::ingestion(Path::new("data/beers.json"), "eof"),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::repository(
        ApiError::from(RepositoryError::Unavailable("down".to_string())),
        StatusCode::BAD_GATEWAY
    )]
    #[case::load(
        ApiError::from(LoadError::Cancelled { relation: "beersByBrewery" }),
        StatusCode::BAD_GATEWAY
    )]
    fn test_status_codes(#[case] err: ApiError, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::NotReady(String::new()).error_code(), "NOT_READY");
        assert_eq!(
            ApiError::from(LoadError::Cancelled { relation: "breweryById" }).error_code(),
            "LOAD_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::ingestion(Path::new("data/beers.json"), "expected value");
        assert_eq!(
            err.to_string(),
            "failed to ingest data/beers.json: expected value"
        );
    }

    #[test]
    fn test_field_error_carries_code() {
        let err = ApiError::from(RepositoryError::Unavailable("down".to_string())).extend();
        assert_eq!(err.message, "repository error: repository unavailable: down");
        let extensions = err.extensions.expect("extensions set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("REPOSITORY_ERROR"))
        );
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = ApiError::NotReady("no data loaded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "NOT_READY");
    }
}
