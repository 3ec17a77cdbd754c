//! HTTP response types and utilities
//!
//! Every endpoint answers with the same `ApiResponse` envelope. Engine
//! rejections map to 400, storage timeouts to 504, and every other
//! failure to 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult, TahapError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create an error response with details
    pub fn error_with_details(
        message: String,
        details: HashMap<String, String>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            details: Some(details),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Helper function to convert AppResult to HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => ok(data).into_response(),
        Err(error) => handle_error(error).into_response(),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> impl IntoResponse {
    let (status, message, details) = match &error {
        AppError::Tahap(tahap_error) => match tahap_error {
            TahapError::InvalidStage(_) | TahapError::InvalidSubtask(_) => {
                (StatusCode::BAD_REQUEST, tahap_error.to_string(), None)
            }
            TahapError::StorageTimeout { operation, after } => {
                let mut details = HashMap::new();
                details.insert("operation".to_string(), operation.to_string());
                details.insert(
                    "timeout".to_string(),
                    humantime::format_duration(*after).to_string(),
                );
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Storage operation timed out".to_string(),
                    Some(details),
                )
            }
            TahapError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Data access failed".to_string(),
                None,
            ),
        },
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {message}"),
            None,
        ),
    };

    if status.is_server_error() {
        tracing::error!("Request failed with {}: {}", status, error);
    }

    let response = if let Some(details) = details {
        ApiResponse::<()>::error_with_details(message, details)
    } else {
        ApiResponse::<()>::error(message)
    };

    (status, Json(response))
}

/// Success response helpers
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

pub fn service_unavailable(message: &str) -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(message.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RepositoryError;
    use std::time::Duration;

    fn status_of(error: AppError) -> StatusCode {
        handle_error(error).into_response().status()
    }

    #[test]
    fn engine_errors_map_to_statuses() {
        assert_eq!(
            status_of(TahapError::InvalidStage(9).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(TahapError::InvalidSubtask(7).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                TahapError::StorageTimeout {
                    operation: "save",
                    after: Duration::from_secs(10),
                }
                .into()
            ),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(TahapError::Repository(RepositoryError::corrupt("t", "m")).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn configuration_errors_are_server_errors() {
        assert_eq!(
            status_of(AppError::configuration("tahap 2: subtask_count out of range")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 42);
        assert!(value.get("error").is_none());
        assert!(value.get("timestamp").is_some());
    }
}
