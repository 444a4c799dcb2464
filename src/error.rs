use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::webhooks::SignatureError;

/// The main error type for hubhook
#[derive(Debug, thiserror::Error)]
pub enum HubhookError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON body written for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl HubhookError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Convert the error into a response
    ///
    /// # Security
    ///
    /// Internal error details are only exposed when `dev_mode` is `true`.
    /// Otherwise server errors carry a generic message; the full error is
    /// logged with the same `error_id` that is returned to the client.
    pub fn into_response_with(self, dev_mode: bool) -> Response {
        let status = self.status_code();

        let error_msg = if dev_mode {
            self.to_string()
        } else {
            self.safe_message()
        };

        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: error_msg,
            error_id,
        });

        (status, body).into_response()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Signature(SignatureError::SignatureMismatch) => StatusCode::UNAUTHORIZED,
            Self::Signature(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Config(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message suitable for client responses in production.
    ///
    /// Client errors keep their message. Server errors are replaced by a
    /// generic message (CWE-209).
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(msg) => format!("Not found: {}", msg),
            Self::BadRequest(msg) => format!("Bad request: {}", msg),
            Self::Unauthorized(msg) => format!("Unauthorized: {}", msg),
            Self::Signature(e) => e.to_string(),

            Self::Internal(_) | Self::Config(_) | Self::Anyhow(_) => {
                "Internal server error".to_string()
            }
            Self::ServiceUnavailable(_) => "Service unavailable".to_string(),
        }
    }
}

impl IntoResponse for HubhookError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

/// Result type alias for hubhook handlers
pub type Result<T> = std::result::Result<T, HubhookError>;

impl From<serde_json::Error> for HubhookError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            HubhookError::BadRequest(format!("JSON error: {}", err))
        } else {
            HubhookError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}

impl From<reqwest::Error> for HubhookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            HubhookError::ServiceUnavailable(format!("Connection error: {}", err))
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 => HubhookError::Unauthorized("Upstream authentication failed".to_string()),
                404 => HubhookError::NotFound("Upstream resource not found".to_string()),
                503 => HubhookError::ServiceUnavailable("Upstream service unavailable".to_string()),
                _ => HubhookError::Internal(format!("Upstream error: {}", err)),
            }
        } else {
            HubhookError::Internal(format!("Request error: {}", err))
        }
    }
}
