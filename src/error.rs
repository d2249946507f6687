use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Rejection of user input before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be a whole number, got {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i32,
        max: i32,
    },
}

/// Every way a call through the gateway can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Not found")]
    NotFound,

    #[error("Server error")]
    Server,

    #[error("Client error {status}")]
    Client { status: u16, message: Option<String> },

    #[error("Unexpected status {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Classify a non-success HTTP status. `body` is the raw response text,
    /// searched for a `message` field on 4xx responses.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => ApiError::NotFound,
            500 => ApiError::Server,
            400..=499 => ApiError::Client {
                status,
                message: serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                    .filter(|m| !m.is_empty()),
            },
            _ => ApiError::Status { status },
        }
    }

    /// Text shown in banners and toasts.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout => {
                "Request timeout. Please check your connection and try again.".to_string()
            }
            ApiError::NotFound => "Courses endpoint not found. Please contact support.".to_string(),
            ApiError::Server => "Server error. Please try again later.".to_string(),
            ApiError::Client { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Client error occurred.".to_string()),
            ApiError::Status { .. } => self.to_string(),
            ApiError::Network(msg) if !msg.is_empty() => msg.clone(),
            ApiError::Network(_) => "Network error occurred.".to_string(),
            ApiError::MalformedResponse(_) => "Invalid response format from server".to_string(),
            ApiError::Cancelled => "Request cancelled".to_string(),
            ApiError::Validation(e) => e.to_string(),
        }
    }
}

/// Errors returned by the HTTP routes of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] ApiError),

    #[error("Rendering failed: {0}")]
    Render(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Render(msg) => {
                error!("render error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Upstream(e) => {
                error!("upstream error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.clone(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
