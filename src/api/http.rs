use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, Response, StatusCode };
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use super::{ ApiConfig, ApiError, ChatApi, ConfigError };
use crate::models::api::{
    ChatReply,
    ChatRequest,
    Credits,
    Eligibility,
    EligibilityRequest,
    HealthReport,
    History,
};

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct HttpChatApi {
    http: HttpClient,
    base_url: String,
}

impl HttpChatApi {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    fn api_endpoint(&self, route: &str, segment: &str) -> String {
        self.endpoint(&format!("/api/{}/{}", route, urlencoding::encode(segment)))
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let body = resp.text().await?;
        interpret(status, &body)
    }
}

/// Turns a status and raw body into the expected payload. An `error` string in
/// the body wins over everything else, matching how the server reports
/// application failures with both 2xx and 4xx codes.
pub fn interpret<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let value = serde_json::from_str::<JsonValue>(body).ok();

    if let Some(message) = value.as_ref().and_then(application_error) {
        return Err(ApiError::Application(message));
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: truncate(body),
        });
    }

    let value = value.ok_or_else(||
        ApiError::Decode(format!("expected a JSON body, got '{}'", truncate(body)))
    )?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn application_error(value: &JsonValue) -> Option<String> {
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.to_string())
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn health(&self) -> HealthReport {
        let url = self.endpoint("/health");
        match self.http.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let detail = resp.json::<JsonValue>().await.ok();
                HealthReport { healthy: true, detail }
            }
            Ok(resp) => {
                warn!("Health check at {} returned {}", url, resp.status());
                HealthReport::unhealthy()
            }
            Err(e) => {
                warn!("Health check at {} failed: {}", url, e);
                HealthReport::unhealthy()
            }
        }
    }

    async fn check_eligibility(
        &self,
        user_address: &str,
        model_id: u32
    ) -> Result<Eligibility, ApiError> {
        let url = self.endpoint("/api/check-eligibility");
        debug!("Checking eligibility of {} for model {}", user_address, model_id);
        let req = EligibilityRequest { user_address, model_id };
        let resp = self.http.post(&url).json(&req).send().await?;
        Self::read(resp).await
    }

    async fn get_credits(&self, user_address: &str) -> Result<Credits, ApiError> {
        let url = self.api_endpoint("credits", user_address);
        debug!("Fetching credits from {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::read(resp).await
    }

    async fn get_models(&self) -> Result<JsonValue, ApiError> {
        let url = self.endpoint("/api/models");
        let resp = self.http.get(&url).send().await?;
        Self::read(resp).await
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, ApiError> {
        let url = self.endpoint("/api/chat");
        debug!(
            "Sending chat message for session {} (model {}, {} chars)",
            request.session_id,
            request.model_id,
            request.message.len()
        );
        let resp = self.http.post(&url).json(request).send().await?;
        Self::read(resp).await
    }

    async fn get_history(&self, session_id: &str) -> Result<History, ApiError> {
        let url = self.api_endpoint("history", session_id);
        let resp = self.http.get(&url).send().await?;
        Self::read(resp).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        let url = self.api_endpoint("session", session_id);
        let resp = self.http.delete(&url).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<JsonValue>(&body).ok().as_ref().and_then(application_error) {
            Some(message) => Err(ApiError::Application(message)),
            None => Err(ApiError::Status { status: status.as_u16(), body: truncate(&body) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::time::Duration;

    #[test]
    fn error_field_wins_even_on_success_status() {
        let res = interpret::<Eligibility>(StatusCode::OK, r#"{"error":"Invalid address"}"#);
        assert!(matches!(res, Err(ApiError::Application(m)) if m == "Invalid address"));
    }

    #[test]
    fn error_field_on_client_error_status() {
        let res = interpret::<ChatReply>(
            StatusCode::PAYMENT_REQUIRED,
            r#"{"error":"Insufficient credits"}"#
        );
        assert!(matches!(res, Err(ApiError::Application(m)) if m == "Insufficient credits"));
    }

    #[test]
    fn plain_server_error_keeps_status() {
        let res = interpret::<Credits>(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(
            matches!(res, Err(ApiError::Status { status: 502, ref body }) if body == "upstream down")
        );
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let res = interpret::<Credits>(StatusCode::OK, "<html>");
        assert!(matches!(res, Err(ApiError::Decode(_))));
    }

    #[test]
    fn missing_fields_are_a_decode_error() {
        let res = interpret::<Credits>(StatusCode::OK, r#"{"balance": 3}"#);
        assert!(matches!(res, Err(ApiError::Decode(_))));
    }

    #[test]
    fn well_formed_body_decodes() {
        let credits = interpret::<Credits>(StatusCode::OK, r#"{"credits": 1.5}"#).unwrap();
        assert_eq!(credits.credits, Decimal::new(15, 1));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY + 10);
        let short = truncate(&body);
        assert_eq!(short.len(), MAX_ERROR_BODY + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn path_segments_are_encoded() {
        let config = ApiConfig::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        let api = HttpChatApi::from_config(&config).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3001");
        assert_eq!(
            api.api_endpoint("credits", "0x AB/C"),
            "http://localhost:3001/api/credits/0x%20AB%2FC"
        );
    }
}
