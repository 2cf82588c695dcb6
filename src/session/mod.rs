pub mod client;
pub mod export;
pub mod refresh;

use chrono::{ DateTime, Local };
use log::warn;
use rust_decimal::Decimal;
use crate::catalog::DEFAULT_MODEL_ID;
use crate::models::chat::{ format_timestamp, Message, Role };

pub use client::SessionClient;

/// Client-side view of one conversation.
///
/// A `Session` only changes through [`Session::apply`]; the I/O side lives in
/// [`SessionClient`], which decides what happened and feeds the matching
/// [`SessionEvent`] back in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: Option<String>,
    pub user_address: String,
    pub selected_model_id: u32,
    pub messages: Vec<Message>,
    pub total_cost: Decimal,
    pub last_activity_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AddressChanged(String),
    ModelSelected(u32),
    /// Optimistic append of the user's message. `session_id` is only used when
    /// the session does not have one yet.
    UserMessageSubmitted {
        session_id: String,
        content: String,
        at: DateTime<Local>,
    },
    AssistantReplied {
        content: String,
        cost: Option<Decimal>,
        at: DateTime<Local>,
    },
    HistoryFetched(Vec<Message>),
    Cleared,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_MODEL_ID)
    }
}

impl Session {
    pub fn new(user_address: impl Into<String>, selected_model_id: u32) -> Self {
        Self {
            session_id: None,
            user_address: user_address.into(),
            selected_model_id,
            messages: Vec::new(),
            total_cost: Decimal::ZERO,
            last_activity_at: Local::now(),
        }
    }

    /// Number of messages the local user has sent in this session.
    pub fn message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }

    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn apply(mut self, event: SessionEvent) -> Session {
        match event {
            SessionEvent::AddressChanged(address) => {
                self.user_address = address;
            }
            SessionEvent::ModelSelected(model_id) => {
                self.selected_model_id = model_id;
            }
            SessionEvent::UserMessageSubmitted { session_id, content, at } => {
                if self.session_id.is_none() {
                    self.session_id = Some(session_id);
                }
                self.messages.push(Message::user(content, format_timestamp(&at)));
                self.last_activity_at = at;
            }
            SessionEvent::AssistantReplied { content, cost, at } => {
                self.messages.push(Message::assistant(content, format_timestamp(&at)));
                match cost {
                    Some(cost) if cost < Decimal::ZERO => {
                        warn!("Ignoring negative cost {} reported by the server", cost);
                    }
                    Some(cost) => {
                        match self.total_cost.checked_add(cost) {
                            Some(total) => {
                                self.total_cost = total;
                            }
                            None => {
                                warn!(
                                    "Ignoring cost {} reported by the server: total {} would overflow",
                                    cost,
                                    self.total_cost
                                );
                            }
                        }
                    }
                    None => {}
                }
            }
            SessionEvent::HistoryFetched(history) => {
                if history.len() > self.messages.len() {
                    self.messages = history;
                }
            }
            SessionEvent::Cleared => {
                self.session_id = None;
                self.messages.clear();
                self.total_cost = Decimal::ZERO;
            }
        }
        self
    }
}
