use axum::http::HeaderMap;
use serde_json::Value;

/// Header naming the event type
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying GitHub's unique id for a delivery
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Event name assumed when the delivery carries no event header.
///
/// GitHub's connectivity test is the only delivery observed without one.
pub const DEFAULT_EVENT: &str = "ping";

/// A verified webhook delivery, ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    name: String,
    delivery_id: Option<String>,
    payload: Value,
}

impl WebhookEvent {
    pub fn new(name: Option<&str>, payload: Value) -> Self {
        Self {
            name: name.unwrap_or(DEFAULT_EVENT).to_string(),
            delivery_id: None,
            payload,
        }
    }

    /// Build an event from the request headers and an already-verified payload
    ///
    /// Only an absent event header means `"ping"`. A present one that is not
    /// valid UTF-8 is decoded lossily, so it matches no registered name.
    pub fn from_headers(headers: &HeaderMap, payload: Value) -> Self {
        let name = headers
            .get(EVENT_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()));

        let mut event = Self::new(name.as_deref(), payload);
        event.delivery_id = header_str(headers, DELIVERY_HEADER).map(str::to_string);
        event
    }

    pub fn with_delivery_id(mut self, delivery_id: impl Into<String>) -> Self {
        self.delivery_id = Some(delivery_id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delivery_id(&self) -> Option<&str> {
        self.delivery_id.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }
}

/// Read a header as a string, treating non-UTF-8 values as absent
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_absent_name_defaults_to_ping() {
        let event = WebhookEvent::new(None, json!({}));
        assert_eq!(event.name(), "ping");
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-GitHub-Event", HeaderValue::from_static("push"));
        headers.insert(
            "X-GitHub-Delivery",
            HeaderValue::from_static("72d3162e-cc78-11e3-81ab-4c9367dc0958"),
        );

        let event = WebhookEvent::from_headers(&headers, json!({"ref": "refs/heads/main"}));
        assert_eq!(event.name(), "push");
        assert_eq!(event.delivery_id(), Some("72d3162e-cc78-11e3-81ab-4c9367dc0958"));
        assert_eq!(event.payload()["ref"], "refs/heads/main");
    }

    #[test]
    fn test_from_headers_without_event_header() {
        let event = WebhookEvent::from_headers(&HeaderMap::new(), json!({"zen": "test"}));
        assert_eq!(event.name(), DEFAULT_EVENT);
        assert_eq!(event.delivery_id(), None);
    }

    #[test]
    fn test_non_utf8_event_header_does_not_become_ping() {
        let mut headers = HeaderMap::new();
        headers.insert("X-GitHub-Event", HeaderValue::from_bytes(b"pu\xffsh").unwrap());

        let event = WebhookEvent::from_headers(&headers, json!({}));
        assert_ne!(event.name(), DEFAULT_EVENT);
        assert_eq!(event.name(), "pu\u{FFFD}sh");
    }

    #[test]
    fn test_empty_event_header_is_kept_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert("X-GitHub-Event", HeaderValue::from_static(""));

        let event = WebhookEvent::from_headers(&headers, Value::Null);
        assert_eq!(event.name(), "");
    }
}
