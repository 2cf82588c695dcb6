use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalised label used in exports and the console.
    pub fn title(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of the conversation log. `timestamp` is local wall-clock `HH:MM:SS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), timestamp: timestamp.into() }
    }

    pub fn assistant(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), timestamp: timestamp.into() }
    }
}

pub fn format_timestamp(at: &chrono::DateTime<chrono::Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
