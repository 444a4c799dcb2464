//! Tests for App, AppBuilder and AppContext wiring

use axum::{Json, Router, routing::get};
use hubhook::testing::{get as test_get, webhook};
use hubhook::webhooks::{HandlerRegistry, HmacSha1Verifier, WebhookModule};
use hubhook::{App, AppContext, ConfigBuilder, Result, RouteModule};
use serde_json::{Value, json};

// A module with a prefix
struct StatusModule;

impl RouteModule for StatusModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route(
            "/events",
            get(|axum::extract::State(ctx): axum::extract::State<AppContext>| async move {
                let events: Vec<String> = ctx
                    .registry()
                    .registered_events()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                Json(json!({ "events": events }))
            }),
        )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/internal")
    }
}

fn pong(_: &Value) -> Result<Option<Value>> {
    Ok(Some(json!({"pong": true})))
}

#[tokio::test]
async fn test_webhook_module_mounts_at_custom_path() {
    let context = AppContext::builder()
        .with_verifier(HmacSha1Verifier::new("s3cr3t"))
        .with_registry(HandlerRegistry::new().with_handler("ping", pong))
        .build();

    let app = App::builder()
        .register_module(WebhookModule::new("/hooks/gh"))
        .with_context(context)
        .build()
        .into_test_router();

    webhook(app.clone(), "/hooks/gh")
        .event("ping")
        .raw_body(&b"{}"[..])
        .signed(b"s3cr3t")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("pong", json!(true))
        .await;

    webhook(app, "/webhooks/github")
        .event("ping")
        .raw_body(&b"{}"[..])
        .signed(b"s3cr3t")
        .execute()
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_webhook_route_rejects_get() {
    let app = App::builder()
        .register_module(WebhookModule::default())
        .build()
        .into_test_router();

    test_get(app, "/webhooks/github")
        .execute()
        .await
        .assert_status(axum::http::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_prefixed_module_sees_registered_events() {
    let mut builder = AppContext::builder();
    builder
        .registry_mut()
        .register("push", pong)
        .register("issues", pong);

    let app = App::builder()
        .register_module(StatusModule)
        .with_context(builder.build())
        .build()
        .into_test_router();

    test_get(app, "/internal/events")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("events", json!(["issues", "push"]))
        .await;
}

#[tokio::test]
async fn test_health_endpoint_reports_components() {
    let context = AppContext::builder()
        .with_verifier(HmacSha1Verifier::new("s3cr3t"))
        .with_registry(HandlerRegistry::new().with_handler("ping", pong))
        .build();

    let app = App::builder()
        .register_module(WebhookModule::default())
        .with_context(context)
        .build()
        .into_test_router();

    test_get(app, "/health")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("status", json!("healthy"))
        .await
        .assert_json_path("checks.0.name", json!("signature_verification"))
        .await;
}

#[tokio::test]
async fn test_health_is_degraded_without_handlers() {
    let app = App::builder().build().into_test_router();

    test_get(app, "/health")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("status", json!("degraded"))
        .await;
}

#[tokio::test]
async fn test_context_from_config_uses_configured_secret() {
    let config = ConfigBuilder::new()
        .with_webhook_secret("from-config")
        .build()
        .unwrap();

    let context = AppContext::builder()
        .from_config(&config)
        .unwrap()
        .with_registry(HandlerRegistry::new().with_handler("ping", pong))
        .build();

    let app = App::builder()
        .register_module(WebhookModule::new(config.webhook.path.clone()))
        .with_config(config)
        .with_context(context)
        .build()
        .into_test_router();

    webhook(app.clone(), "/webhooks/github")
        .raw_body(&b"{}"[..])
        .signed(b"from-config")
        .execute()
        .await
        .assert_ok();

    webhook(app, "/webhooks/github")
        .raw_body(&b"{}"[..])
        .signed(b"other")
        .execute()
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = ConfigBuilder::new()
        .with_webhook_secret("s3cr3t")
        .with_max_body_size(64)
        .build()
        .unwrap();

    let context = AppContext::builder().from_config(&config).unwrap().build();
    let app = App::builder()
        .register_module(WebhookModule::default())
        .with_config(config)
        .with_context(context)
        .build()
        .into_test_router();

    let body = serde_json::to_vec(&json!({"padding": "x".repeat(256)})).unwrap();
    webhook(app, "/webhooks/github")
        .raw_body(body)
        .signed(b"s3cr3t")
        .execute()
        .await
        .assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
}
