use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

use crate::webhooks::event::{DELIVERY_HEADER, EVENT_HEADER};
use crate::webhooks::signature::{self, SIGNATURE_HEADER};

/// Request builder for a single in-process call
///
/// The body is kept as bytes until [`execute`](Self::execute) so that
/// [`signed`](Self::signed) can compute the signature over exactly what is
/// sent.
pub struct Scenario {
    app: Router,
    method: Method,
    uri: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Vec<u8>,
}

impl Scenario {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            method: Method::GET,
            uri: "/".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    /// Add a header, replacing any earlier value with the same name
    pub fn header(self, key: &str, value: &str) -> Self {
        self.header_bytes(key, value.as_bytes())
    }

    /// Add a header whose value need not be UTF-8
    pub fn header_bytes(mut self, key: &str, value: &[u8]) -> Self {
        let name = HeaderName::from_bytes(key.as_bytes()).expect("invalid header name");
        let value = HeaderValue::from_bytes(value).expect("invalid header value");
        self.headers.retain(|(existing, _)| *existing != name);
        self.headers.push((name, value));
        self
    }

    /// Set the `X-GitHub-Event` header
    pub fn event(self, name: &str) -> Self {
        self.header(EVENT_HEADER, name)
    }

    /// Set the `X-GitHub-Delivery` header
    pub fn delivery(self, id: &str) -> Self {
        self.header(DELIVERY_HEADER, id)
    }

    /// Set `X-Hub-Signature` to the signature of the current body
    ///
    /// Call after the body has been set.
    pub fn signed(self, secret: &[u8]) -> Self {
        let value = signature::sign(secret, &self.body);
        self.signature(&value)
    }

    /// Set `X-Hub-Signature` to an arbitrary value
    pub fn signature(self, value: &str) -> Self {
        self.header(SIGNATURE_HEADER, value)
    }

    /// Set JSON body from a serializable type
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        self.body = serde_json::to_vec(body).expect("body must serialize");
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Set the body to raw bytes
    pub fn raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Execute the request and get an assertion builder
    pub async fn execute(self) -> ScenarioAssert {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(Body::from(self.body))
            .expect("invalid request");

        for (name, value) in self.headers {
            request.headers_mut().insert(name, value);
        }

        let response = self.app.oneshot(request).await.expect("router is infallible");
        ScenarioAssert { response }
    }
}

/// Assertion builder for test responses
pub struct ScenarioAssert {
    response: axum::response::Response,
}

impl ScenarioAssert {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_unauthorized(self) -> Self {
        self.assert_status(StatusCode::UNAUTHORIZED)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_server_error(self) -> Self {
        self.assert_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Assert a header exists with the given value
    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .response
            .headers()
            .get(key)
            .unwrap_or_else(|| panic!("Header '{}' not found", key))
            .to_str()
            .unwrap();
        assert_eq!(value, expected, "Header '{}' value mismatch", key);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub async fn body_bytes(self) -> Vec<u8> {
        axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    pub async fn body_string(self) -> String {
        String::from_utf8(self.body_bytes().await).unwrap()
    }

    /// Parse the JSON response body into a type
    pub async fn json<T: for<'de> Deserialize<'de>>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes).expect("Failed to parse JSON response")
    }

    /// Assert the value at a dot-separated path (`"a.b.0"`) of the JSON body
    pub async fn assert_json_path(self, path: &str, expected: serde_json::Value) -> Self {
        let status = self.response.status();
        let bytes = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let actual = json_path_get(&json, path)
            .unwrap_or_else(|| panic!("Path '{}' not found in JSON: {}", path, json));
        assert_eq!(actual, &expected, "JSON path '{}' value mismatch", path);

        let mut response = axum::response::Response::new(Body::from(bytes));
        *response.status_mut() = status;
        Self { response }
    }

    /// Assert the response body does not contain `text`
    pub async fn assert_not_contains(self, text: &str) -> Self {
        let status = self.response.status();
        let body = self.body_string().await;
        assert!(
            !body.contains(text),
            "Response body unexpectedly contains '{}'. Body: {}",
            text,
            body
        );

        let mut response = axum::response::Response::new(Body::from(body));
        *response.status_mut() = status;
        Self { response }
    }

    /// Get the underlying response for custom assertions
    pub fn response(self) -> axum::response::Response {
        self.response
    }
}

fn json_path_get<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(json, |current, part| match part.parse::<usize>() {
        Ok(index) => current.get(index),
        Err(_) => current.get(part),
    })
}

pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}

pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::POST).uri(uri)
}

/// POST a GitHub-style delivery to `uri`
pub fn webhook(app: Router, uri: &str) -> Scenario {
    post(app, uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, http::HeaderMap, routing::post as axum_post};
    use serde_json::json;

    async fn echo_headers(headers: HeaderMap, body: axum::body::Bytes) -> Json<serde_json::Value> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "event": get("x-github-event"),
            "delivery": get("x-github-delivery"),
            "signature": get("x-hub-signature"),
            "len": body.len(),
        }))
    }

    fn app() -> Router {
        Router::new().route("/echo", axum_post(echo_headers))
    }

    #[tokio::test]
    async fn test_webhook_sets_github_headers() {
        let body: serde_json::Value = webhook(app(), "/echo")
            .event("push")
            .delivery("d-1")
            .raw_body(&b"{}"[..])
            .signed(b"secret")
            .execute()
            .await
            .assert_ok()
            .json()
            .await;

        assert_eq!(body["event"], "push");
        assert_eq!(body["delivery"], "d-1");
        assert_eq!(body["signature"], signature::sign(b"secret", b"{}"));
        assert_eq!(body["len"], 2);
    }

    #[tokio::test]
    async fn test_header_replaces_previous_value() {
        webhook(app(), "/echo")
            .event("push")
            .event("issues")
            .execute()
            .await
            .assert_ok()
            .assert_json_path("event", json!("issues"))
            .await;
    }

    #[tokio::test]
    async fn test_unknown_route() {
        get(app(), "/missing").execute().await.assert_not_found();
    }

    #[test]
    fn test_json_path_get() {
        let value = json!({"checks": [{"name": "a"}], "status": "ok"});
        assert_eq!(json_path_get(&value, "status"), Some(&json!("ok")));
        assert_eq!(json_path_get(&value, "checks.0.name"), Some(&json!("a")));
        assert_eq!(json_path_get(&value, "checks.1"), None);
    }
}
