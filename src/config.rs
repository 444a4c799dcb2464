use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{HubhookError, Result};
use crate::utils::{get_env_with_prefix, parse_bool};

/// Main configuration for a hubhook server
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Return full error messages to clients. Never enable in production.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 25MB, GitHub's payload cap)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Settings for the webhook endpoint
///
/// The shared secret is never serialized and is redacted from debug output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    /// Route the ingress handler is mounted on
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Publicly reachable callback URL registered with the provider
    #[serde(default)]
    pub url: Option<String>,
    /// Verify `X-Hub-Signature` on every delivery
    #[serde(default = "default_verify")]
    pub verify: bool,
    #[serde(skip)]
    pub secret: Option<SecretString>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            path: default_webhook_path(),
            url: None,
            verify: default_verify(),
            secret: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_size() -> usize {
    25 * 1024 * 1024
}

fn default_webhook_path() -> String {
    "/webhooks/github".to_string()
}

fn default_verify() -> bool {
    true
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_webhook_path(mut self, path: impl Into<String>) -> Self {
        self.config.webhook.path = path.into();
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.webhook.secret = Some(SecretString::new(secret.into()));
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.webhook.url = Some(url.into());
        self
    }

    /// Disable signature verification (local development only)
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.config.webhook.verify = enabled;
        self
    }

    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.config.dev_mode = enabled;
        self
    }

    /// Load configuration from the environment
    ///
    /// Server and logging settings use the `HUBHOOK_` prefix with an
    /// unprefixed fallback. The secret and callback URL come from
    /// `GITHUB_WEBHOOK_SECRET` and `GITHUB_WEBHOOK_URL`.
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            match port.parse() {
                Ok(p) => self.config.server.port = p,
                Err(e) => tracing::warn!(
                    value = %port,
                    error = %e,
                    default = self.config.server.port,
                    "Ignoring unparsable PORT"
                ),
            }
        }
        if let Some(max_body_size) = get_env_with_prefix("MAX_BODY_SIZE") {
            match max_body_size.parse() {
                Ok(size) => self.config.server.max_body_size = size,
                Err(e) => tracing::warn!(
                    value = %max_body_size,
                    error = %e,
                    default = self.config.server.max_body_size,
                    "Ignoring unparsable MAX_BODY_SIZE"
                ),
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = parse_bool(&json).unwrap_or(false);
        }
        if let Some(dev) = get_env_with_prefix("DEV_MODE") {
            self.config.dev_mode = parse_bool(&dev).unwrap_or(false);
        }

        if let Some(path) = get_env_with_prefix("WEBHOOK_PATH") {
            self.config.webhook.path = path;
        }
        if let Some(verify) = get_env_with_prefix("WEBHOOK_VERIFY") {
            // Anything unparsable keeps verification on
            self.config.webhook.verify = parse_bool(&verify).unwrap_or(true);
        }
        if let Some(secret) = get_env_with_prefix("GITHUB_WEBHOOK_SECRET") {
            self.config.webhook.secret = Some(SecretString::new(secret));
        }
        if let Some(url) = get_env_with_prefix("GITHUB_WEBHOOK_URL") {
            self.config.webhook.url = Some(url);
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns [`HubhookError::Config`] if:
    /// - the server address (host:port) does not parse, or the port is 0
    /// - the log level is unknown
    /// - the body size limit is 0
    /// - the webhook path does not start with `/`
    /// - verification is enabled but no non-empty secret is set
    /// - the callback URL is not an absolute http(s) URL
    pub fn build(self) -> Result<Config> {
        let config = self.config;

        config.server.addr().map_err(|e| {
            HubhookError::config(format!(
                "Invalid server address {}:{} - {}",
                config.server.host, config.server.port, e
            ))
        })?;

        if config.server.port == 0 {
            return Err(HubhookError::config("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(HubhookError::config(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if config.server.max_body_size == 0 {
            return Err(HubhookError::config("Maximum body size must be greater than 0"));
        }

        if !config.webhook.path.starts_with('/') {
            return Err(HubhookError::config(format!(
                "Webhook path must start with '/', got: {}",
                config.webhook.path
            )));
        }

        if config.webhook.verify {
            let has_secret = config
                .webhook
                .secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().is_empty());
            if !has_secret {
                return Err(HubhookError::config(
                    "GITHUB_WEBHOOK_SECRET must be set when signature verification is enabled",
                ));
            }
        }

        if let Some(ref raw) = config.webhook.url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| HubhookError::config(format!("Invalid webhook URL {}: {}", raw, e)))?;
            if parsed.scheme() != "https" && parsed.scheme() != "http" {
                return Err(HubhookError::config(format!(
                    "Webhook URL must use http or https, got: {}",
                    parsed.scheme()
                )));
            }
        }

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
