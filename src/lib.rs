//! hubhook - signed GitHub webhook ingress for Axum
//!
//! Every delivery goes through two stages:
//!
//! - **Verification**: the raw body is checked against the `X-Hub-Signature`
//!   header with HMAC-SHA1 and a constant-time comparison.
//! - **Dispatch**: handlers registered for the `X-GitHub-Event` name run in
//!   registration order until one of them returns a response; otherwise the
//!   delivery is acknowledged with `{"status": "OK"}`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hubhook::{App, AppContext, ConfigBuilder, Result};
//! use hubhook::webhooks::{HandlerRegistry, WebhookModule};
//! use serde_json::{Value, json};
//!
//! fn on_ping(_: &Value) -> Result<Option<Value>> {
//!     Ok(Some(json!({"pong": true})))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     hubhook::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!
//!     let registry = HandlerRegistry::new().with_handler("ping", on_ping);
//!     let context = AppContext::builder()
//!         .from_config(&config)?
//!         .with_registry(registry)
//!         .build();
//!
//!     App::builder()
//!         .register_module(WebhookModule::new(config.webhook.path.clone()))
//!         .with_config(config)
//!         .with_context(context)
//!         .build()
//!         .serve()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod app;
pub mod config;
mod core;
mod error;
pub mod health;
pub mod http;
pub mod testing;
pub mod utils;
pub mod webhooks;

pub use app::{AppContext, AppContextBuilder};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig, WebhookConfig};
pub use crate::core::{App, AppBuilder};
pub use error::{ErrorResponse, HubhookError, Result};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use http::RouteModule;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "hubhook=debug")
/// - `HUBHOOK_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .and_then(|v| utils::parse_bool(&v))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from the logging section of a [`Config`]
pub fn init_tracing_with_config(config: &Config) {
    install_subscriber(EnvFilter::new(&config.logging.level), config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
