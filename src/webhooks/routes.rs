//! Axum ingress for GitHub deliveries.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;

use super::event::WebhookEvent;
use super::signature::signature_header;
use crate::app::AppContext;
use crate::error::HubhookError;
use crate::http::RouteModule;

/// Route module that mounts the webhook endpoint
///
/// Without a context built from a secret every delivery is rejected.
///
/// ```rust,no_run
/// use hubhook::{App, AppContext, webhooks::{HmacSha1Verifier, WebhookModule}};
///
/// let context = AppContext::builder()
///     .with_verifier(HmacSha1Verifier::new("topsecret"))
///     .build();
///
/// let app = App::builder()
///     .register_module(WebhookModule::new("/webhooks/github"))
///     .with_context(context)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct WebhookModule {
    path: String,
}

impl WebhookModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for WebhookModule {
    fn default() -> Self {
        Self::new("/webhooks/github")
    }
}

impl RouteModule for WebhookModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route(&self.path, post(receive_webhook))
    }
}

/// Verify, parse and dispatch one delivery.
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what was sent; JSON parsing happens only after verification succeeds.
pub async fn receive_webhook(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match ingest(&ctx, &headers, &body) {
        Ok(value) => Json(value).into_response(),
        Err(e) => e.into_response_with(ctx.dev_mode),
    }
}

fn ingest(ctx: &AppContext, headers: &HeaderMap, body: &[u8]) -> crate::Result<Value> {
    ctx.verifier.verify(signature_header(headers)?, body)?;

    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Webhook payload is not valid JSON");
        HubhookError::bad_request("malformed JSON payload")
    })?;

    let event = WebhookEvent::from_headers(headers, payload);
    let result = ctx.dispatcher.process_event(&event)?;

    Ok(result.into_value())
}
