pub mod http;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use crate::models::api::{ ChatReply, ChatRequest, Credits, Eligibility, HealthReport, History };
use self::http::HttpChatApi;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything that can go wrong talking to the chat API. The presentation
/// layer only ever needs `to_string()` for its error banner.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unable to reach the API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response from the API: {0}")]
    Decode(String),
    #[error("API returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    /// True for failures below the application level: network, timeout,
    /// unexpected status or a body we could not understand.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Application(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL must be http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self { base_url: parsed, timeout }),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// The HTTP boundary of the dashboard. Every call resolves to a value or an
/// `ApiError`; nothing here panics on a bad server.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /health`. Unreachable servers report `healthy: false`.
    async fn health(&self) -> HealthReport;

    async fn check_eligibility(
        &self,
        user_address: &str,
        model_id: u32
    ) -> Result<Eligibility, ApiError>;

    async fn get_credits(&self, user_address: &str) -> Result<Credits, ApiError>;

    async fn get_models(&self) -> Result<JsonValue, ApiError>;

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, ApiError>;

    async fn get_history(&self, session_id: &str) -> Result<History, ApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;
}

pub fn new_client(config: &ApiConfig) -> Result<Arc<dyn ChatApi>, ConfigError> {
    let client = HttpChatApi::from_config(config)?;
    Ok(Arc::new(client))
}
