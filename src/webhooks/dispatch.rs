use super::event::{DEFAULT_EVENT, WebhookEvent};
use super::registry::HandlerRegistry;
use crate::error::Result;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::sync::Arc;

/// Outcome of dispatching one delivery
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    /// The first value produced by a handler
    Handled(Value),
    /// No handler produced a value; serialized as `{"status": "OK"}`
    Acknowledged,
}

impl DispatchResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The JSON body to send back to the provider
    pub fn into_value(self) -> Value {
        match self {
            Self::Handled(value) => value,
            Self::Acknowledged => json!({"status": "OK"}),
        }
    }
}

impl Serialize for DispatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Handled(value) => value.serialize(serializer),
            Self::Acknowledged => json!({"status": "OK"}).serialize(serializer),
        }
    }
}

/// Dispatcher that invokes the handlers registered for an event
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run the handlers for `event` in registration order
    ///
    /// Stops at the first handler that returns a value. A handler error is
    /// returned as-is and no later handler runs. An absent event name is
    /// treated as `"ping"`.
    pub fn process(&self, event: Option<&str>, payload: &Value) -> Result<DispatchResult> {
        let event = event.unwrap_or(DEFAULT_EVENT);
        let handlers = self.registry.handlers(event);

        tracing::debug!(event, handlers = handlers.len(), "Dispatching webhook event");

        for (index, handler) in handlers.iter().enumerate() {
            match handler.handle(payload) {
                Ok(Some(value)) => {
                    tracing::debug!(event, index, handler = handler.name(), "Handler produced response");
                    return Ok(DispatchResult::Handled(value));
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        event,
                        index,
                        handler = handler.name(),
                        error = %e,
                        "Webhook handler failed"
                    );
                    return Err(e);
                }
            }
        }

        Ok(DispatchResult::Acknowledged)
    }

    /// Dispatch a delivery built from request headers
    pub fn process_event(&self, event: &WebhookEvent) -> Result<DispatchResult> {
        tracing::info!(
            event = event.name(),
            delivery = event.delivery_id().unwrap_or("-"),
            "Event received"
        );

        self.process(Some(event.name()), event.payload())
    }
}
