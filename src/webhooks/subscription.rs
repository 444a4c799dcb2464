//! Creating the webhook on the GitHub side.
//!
//! This is a one-off administrative call: it registers the callback URL and
//! shared secret on a repository so GitHub starts signing deliveries with it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::Config;
use crate::error::{HubhookError, Result};

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Hook definition sent to `POST /repos/{owner}/{repo}/hooks`
#[derive(Debug, Clone, Serialize)]
pub struct HookSubscription {
    name: &'static str,
    active: bool,
    events: Vec<String>,
    config: HookConfig,
}

#[derive(Debug, Clone, Serialize)]
struct HookConfig {
    url: String,
    content_type: &'static str,
    #[serde(serialize_with = "expose")]
    secret: SecretString,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl HookSubscription {
    /// Subscribe `url` to every event (`*`), signed with `secret`
    pub fn new(url: impl Into<String>, secret: SecretString) -> Self {
        Self {
            name: "web",
            active: true,
            events: vec!["*".to_string()],
            config: HookConfig {
                url: url.into(),
                content_type: "json",
                secret,
            },
        }
    }

    /// Build from the configured callback URL and secret
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config
            .webhook
            .url
            .clone()
            .ok_or_else(|| HubhookError::config("GITHUB_WEBHOOK_URL is not set"))?;
        let secret = config
            .webhook
            .secret
            .clone()
            .ok_or_else(|| HubhookError::config("GITHUB_WEBHOOK_SECRET is not set"))?;

        Ok(Self::new(url, secret))
    }

    /// Restrict the hook to specific events
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

/// A hook as returned by the GitHub API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Hook {
    pub id: u64,
    pub url: String,
    pub active: bool,
    #[serde(default)]
    pub events: Vec<String>,
}

/// Minimal GitHub REST client for managing repository hooks
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretString,
}

impl GitHubClient {
    pub fn new(token: SecretString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hubhook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HubhookError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            token,
        })
    }

    /// Point the client at a different API root (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn hooks_url(&self, owner: &str, repository: &str) -> String {
        format!("{}/repos/{}/{}/hooks", self.api_base, owner, repository)
    }

    /// Create the webhook on `owner/repository`
    pub async fn create_hook(
        &self,
        owner: &str,
        repository: &str,
        subscription: &HookSubscription,
    ) -> Result<Hook> {
        let hook: Hook = self
            .http
            .post(self.hooks_url(owner, repository))
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(subscription)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(
            owner,
            repository,
            hook_id = hook.id,
            events = ?hook.events,
            "Webhook created"
        );

        Ok(hook)
    }
}
