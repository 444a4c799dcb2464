//! In-process HTTP testing helpers
//!
//! Drives an Axum router with `tower::ServiceExt::oneshot`, no server needed.
//! [`webhook`] builds a GitHub-style delivery and can sign it.
//!
//! # Example
//!
//! ```rust,ignore
//! use hubhook::testing;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_push_is_acknowledged() {
//!     let app = build_app().into_test_router();
//!
//!     testing::webhook(app, "/webhooks/github")
//!         .event("push")
//!         .json_body(&json!({"ref": "refs/heads/main"}))
//!         .signed(b"topsecret")
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_json_path("status", json!("OK"))
//!         .await;
//! }
//! ```

mod scenario;

pub use scenario::{Scenario, ScenarioAssert, get, post, webhook};
