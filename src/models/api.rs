use rust_decimal::Decimal;
use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;
use crate::models::chat::Message;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRequest<'a> {
    pub user_address: &'a str,
    pub model_id: u32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub user_address: &'a str,
    pub model_id: u32,
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub can_chat: bool,
    pub cost: Decimal,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Credits {
    pub credits: Decimal,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub cost: Option<Decimal>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct History {
    pub history: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub healthy: bool,
    pub detail: Option<JsonValue>,
}

impl HealthReport {
    pub fn unhealthy() -> Self {
        Self { healthy: false, detail: None }
    }

    /// The `status` field of the health body, when the server sent one.
    pub fn status(&self) -> Option<&str> {
        self.detail.as_ref().and_then(|d| d.get("status")).and_then(|s| s.as_str())
    }
}
