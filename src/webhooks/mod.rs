//! Webhook ingress: signature verification and event dispatch.
//!
//! A delivery flows through two stages:
//!
//! 1. [`signature::check`] (wrapped by a [`WebhookVerifier`]) authenticates
//!    the raw body against the `X-Hub-Signature` header.
//! 2. [`Dispatcher::process`] runs the handlers registered for the event name
//!    until one of them returns a response.
//!
//! [`WebhookModule`] wires both stages into an Axum route.

pub mod dispatch;
pub mod event;
pub mod handler;
pub mod registry;
pub mod routes;
pub mod signature;
pub mod subscription;
pub mod verification;

pub use dispatch::{DispatchResult, Dispatcher};
pub use event::{DEFAULT_EVENT, WebhookEvent};
pub use handler::WebhookHandler;
pub use registry::HandlerRegistry;
pub use routes::WebhookModule;
pub use signature::{DigestAlgorithm, SignatureError, SignatureHeader};
pub use subscription::{GitHubClient, Hook, HookSubscription};
pub use verification::{HmacSha1Verifier, NoVerification, RejectAll, WebhookVerifier};
