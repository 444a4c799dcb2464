use crate::error::Result;
use serde_json::Value;

/// Trait for handling webhook events
///
/// A handler either produces the response for the delivery (`Ok(Some(_))`),
/// which stops dispatch for that event, or declines (`Ok(None)`) and lets the
/// next registered handler run. Errors are returned to the caller untouched.
///
/// Plain functions and closures with the matching signature implement this
/// trait automatically.
///
/// # Example
///
/// ```rust
/// use hubhook::Result;
/// use hubhook::webhooks::{HandlerRegistry, WebhookHandler};
/// use serde_json::{Value, json};
///
/// struct PushLogger;
///
/// impl WebhookHandler for PushLogger {
///     fn handle(&self, payload: &Value) -> Result<Option<Value>> {
///         tracing::info!(git_ref = ?payload.get("ref"), "push received");
///         Ok(None)
///     }
/// }
///
/// fn on_ping(_: &Value) -> Result<Option<Value>> {
///     Ok(Some(json!({"pong": true})))
/// }
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("push", PushLogger);
/// registry.register("ping", on_ping);
/// ```
pub trait WebhookHandler: Send + Sync {
    /// Handle the payload of a verified delivery
    fn handle(&self, payload: &Value) -> Result<Option<Value>>;

    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> WebhookHandler for F
where
    F: Fn(&Value) -> Result<Option<Value>> + Send + Sync,
{
    fn handle(&self, payload: &Value) -> Result<Option<Value>> {
        self(payload)
    }
}
