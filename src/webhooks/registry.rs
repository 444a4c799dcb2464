//! Handler registry mapping event names to ordered handler lists
//!
//! Handlers are registered while the registry is still owned by the startup
//! code. Once it is moved into an `Arc` (see [`crate::AppContext`]) it can
//! only be read, so every registration happens-before the first request and
//! lookups need no locking.

use super::handler::WebhookHandler;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of webhook handlers, keyed by event name
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn WebhookHandler>>>,
}

impl HandlerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `event`
    ///
    /// Handlers for the same event accumulate in call order. Registering the
    /// same handler twice runs it twice; there is no removal.
    pub fn register<H>(&mut self, event: &str, handler: H) -> &mut Self
    where
        H: WebhookHandler + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with_handler<H>(mut self, event: &str, handler: H) -> Self
    where
        H: WebhookHandler + 'static,
    {
        self.register(event, handler);
        self
    }

    /// Handlers registered for `event`, in registration order
    ///
    /// Unknown events yield an empty slice.
    pub fn handlers(&self, event: &str) -> &[Arc<dyn WebhookHandler>] {
        self.handlers.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if any handler is registered for `event`
    pub fn is_registered(&self, event: &str) -> bool {
        !self.handlers(event).is_empty()
    }

    /// All event names with at least one handler, sorted
    pub fn registered_events(&self) -> Vec<&str> {
        let mut events: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        events.sort_unstable();
        events
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for event in self.registered_events() {
            let names: Vec<&str> = self.handlers(event).iter().map(|h| h.name()).collect();
            map.entry(&event, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use serde_json::{Value, json};

    fn tagged(tag: &'static str) -> impl Fn(&Value) -> Result<Option<Value>> + Send + Sync {
        move |_| Ok(Some(json!(tag)))
    }

    #[test]
    fn test_unknown_event_has_no_handlers() {
        let registry = HandlerRegistry::new();
        assert!(registry.handlers("push").is_empty());
        assert!(!registry.is_registered("push"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_preserves_call_order() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("push", tagged("first"))
            .register("push", tagged("second"));
        registry.register("push", tagged("third"));

        let results: Vec<Value> = registry
            .handlers("push")
            .iter()
            .map(|h| h.handle(&Value::Null).unwrap().unwrap())
            .collect();

        assert_eq!(results, vec![json!("first"), json!("second"), json!("third")]);
    }

    #[test]
    fn test_same_handler_twice_is_not_deduplicated() {
        fn ack(_: &Value) -> Result<Option<Value>> {
            Ok(None)
        }

        let registry = HandlerRegistry::new()
            .with_handler("issues", ack)
            .with_handler("issues", ack);

        assert_eq!(registry.handlers("issues").len(), 2);
    }

    #[test]
    fn test_registered_events_sorted() {
        let registry = HandlerRegistry::new()
            .with_handler("push", tagged("a"))
            .with_handler("issues", tagged("b"))
            .with_handler("ping", tagged("c"));

        assert_eq!(registry.registered_events(), vec!["issues", "ping", "push"]);
        assert!(registry.is_registered("ping"));
    }

    #[test]
    fn test_shared_registry_is_readable_across_threads() {
        let registry = Arc::new(HandlerRegistry::new().with_handler("push", tagged("x")));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.handlers("push").len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
