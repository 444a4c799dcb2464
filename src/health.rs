use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::app::AppContext;

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        };

        (status_code, Json(self)).into_response()
    }
}

impl HealthResponse {
    /// Inspect the webhook pipeline held in `ctx`
    ///
    /// Disabled verification, a missing secret or an empty registry degrade
    /// the service. None of them stop the process from answering, so none is
    /// reported as unhealthy.
    pub fn from_context(ctx: &AppContext) -> Self {
        let (status, message) = if !ctx.verifier.is_enforcing() {
            (HealthStatus::Degraded, Some("signature verification disabled"))
        } else if !ctx.verifier.is_configured() {
            (HealthStatus::Degraded, Some("no webhook secret configured"))
        } else {
            (HealthStatus::Healthy, None)
        };
        let verifier = ComponentHealth {
            name: "signature_verification".to_string(),
            status,
            message: message.map(str::to_string),
        };

        let events = ctx.registry().registered_events();
        let registry = ComponentHealth {
            name: "handlers".to_string(),
            status: if events.is_empty() {
                HealthStatus::Degraded
            } else {
                HealthStatus::Healthy
            },
            message: Some(format!("{} event(s) registered", events.len())),
        };

        let checks = vec![verifier, registry];
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        Self { status, checks }
    }
}

/// Health check endpoint handler
pub async fn health_handler(State(ctx): State<AppContext>) -> HealthResponse {
    HealthResponse::from_context(&ctx)
}
