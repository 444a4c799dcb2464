use std::sync::Arc;

use crate::config::Config;
use crate::error::{HubhookError, Result};
use crate::webhooks::{
    Dispatcher, HandlerRegistry, HmacSha1Verifier, NoVerification, RejectAll, WebhookVerifier,
};

/// Shared state handed to every request
///
/// Holds the verifier and the frozen handler registry. Both are read-only
/// once the context is built, so cloning it per request is just a couple of
/// `Arc` bumps.
#[derive(Clone)]
pub struct AppContext {
    pub verifier: Arc<dyn WebhookVerifier>,
    pub dispatcher: Dispatcher,
    /// Return full error messages to clients
    pub dev_mode: bool,
}

impl AppContext {
    /// Context with an empty registry that rejects every delivery
    pub fn new() -> Self {
        Self {
            verifier: Arc::new(RejectAll),
            dispatcher: Dispatcher::default(),
            dev_mode: false,
        }
    }

    /// Builder pattern for constructing AppContext
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("verifying", &self.verifier.is_enforcing())
            .field("registry", self.dispatcher.registry())
            .field("dev_mode", &self.dev_mode)
            .finish()
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    verifier: Option<Arc<dyn WebhookVerifier>>,
    registry: HandlerRegistry,
    dev_mode: bool,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            verifier: None,
            registry: HandlerRegistry::new(),
            dev_mode: false,
        }
    }

    /// Pick the verifier described by `config.webhook`
    ///
    /// # Errors
    ///
    /// Fails if verification is enabled and no secret is configured.
    pub fn from_config(mut self, config: &Config) -> Result<Self> {
        let verifier: Arc<dyn WebhookVerifier> = if config.webhook.verify {
            let secret = config.webhook.secret.clone().ok_or_else(|| {
                HubhookError::config("webhook secret is required when verification is enabled")
            })?;
            Arc::new(HmacSha1Verifier::from_secret(secret))
        } else {
            tracing::warn!("Webhook signature verification is DISABLED");
            Arc::new(NoVerification)
        };

        self.verifier = Some(verifier);
        self.dev_mode = config.dev_mode;
        Ok(self)
    }

    pub fn with_verifier<V>(mut self, verifier: V) -> Self
    where
        V: WebhookVerifier + 'static,
    {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Use an already-populated registry
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Mutable access to the registry for startup-time registration
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Freeze the registry and build the context
    pub fn build(self) -> AppContext {
        let defaults = AppContext::new();

        tracing::info!(
            events = ?self.registry.registered_events(),
            "Webhook handler registry initialized"
        );

        AppContext {
            verifier: self.verifier.unwrap_or(defaults.verifier),
            dispatcher: Dispatcher::new(Arc::new(self.registry)),
            dev_mode: self.dev_mode,
        }
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
