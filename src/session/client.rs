use chrono::Local;
use log::{ debug, info, warn };
use serde_json::Value as JsonValue;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use uuid::Uuid;
use super::export::{ self, ExportError };
use super::{ Session, SessionEvent };
use crate::api::{ ApiError, ChatApi };
use crate::catalog::{ self, ModelDescriptor, UnknownModelError };
use crate::models::api::{ ChatReply, ChatRequest, Credits, Eligibility, HealthReport };

/// Owns one [`Session`] and mediates all traffic with the chat API for it.
///
/// Methods that touch the session take `&mut self`, so a call is always awaited
/// to completion before the next one can mutate state.
pub struct SessionClient {
    api: Arc<dyn ChatApi>,
    session: Session,
}

impl SessionClient {
    pub fn new(api: Arc<dyn ChatApi>, session: Session) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let current = std::mem::take(&mut self.session);
        self.session = current.apply(event);
    }

    pub fn set_user_address(&mut self, address: impl Into<String>) {
        self.dispatch(SessionEvent::AddressChanged(address.into()));
    }

    pub fn select_model(
        &mut self,
        model_id: u32
    ) -> Result<&'static ModelDescriptor, UnknownModelError> {
        let model = catalog::find(model_id)?;
        info!("Selected model {}", model.label());
        self.dispatch(SessionEvent::ModelSelected(model_id));
        Ok(model)
    }

    pub async fn check_health(&self) -> HealthReport {
        self.api.health().await
    }

    pub async fn check_eligibility(
        &self,
        user_address: &str,
        model_id: u32
    ) -> Result<Eligibility, ApiError> {
        self.api.check_eligibility(user_address, model_id).await
    }

    pub async fn get_credits(&self, user_address: &str) -> Result<Credits, ApiError> {
        self.api.get_credits(user_address).await
    }

    pub async fn list_remote_models(&self) -> Result<JsonValue, ApiError> {
        self.api.get_models().await
    }

    /// Sends `content` as the user with the session's current address and
    /// model. The user message is appended before the request goes out and is
    /// kept even when the request fails.
    pub async fn send_message(&mut self, content: &str) -> Result<ChatReply, ApiError> {
        let new_id = match &self.session.session_id {
            Some(_) => String::new(),
            None => {
                let id = Uuid::new_v4().to_string();
                info!("Starting chat session {}", id);
                id
            }
        };
        self.dispatch(SessionEvent::UserMessageSubmitted {
            session_id: new_id,
            content: content.to_string(),
            at: Local::now(),
        });

        let session_id = self.session.session_id.clone().unwrap_or_default();
        let request = ChatRequest {
            user_address: &self.session.user_address,
            model_id: self.session.selected_model_id,
            message: content,
            session_id: &session_id,
        };

        let result = self.api.send_chat(&request).await;
        match result {
            Ok(reply) => {
                if let Some(cost) = reply.cost {
                    debug!("Query cost {} for session {}", cost, session_id);
                }
                self.dispatch(SessionEvent::AssistantReplied {
                    content: reply.response.clone(),
                    cost: reply.cost,
                    at: Local::now(),
                });
                Ok(reply)
            }
            Err(e) => {
                warn!("Chat request for session {} failed: {}", session_id, e);
                Err(e)
            }
        }
    }

    /// Pulls the server's history and adopts it when it is longer than the local
    /// log. Returns whether the local log was replaced.
    pub async fn refresh_history(&mut self) -> Result<bool, ApiError> {
        let Some(session_id) = self.session.session_id.clone() else {
            return Ok(false);
        };

        let history = self.api.get_history(&session_id).await.map_err(|e| {
            warn!("Fetching history for session {} failed: {}", session_id, e);
            e
        })?;

        let before = self.session.messages.len();
        let fetched = history.history.len();
        self.dispatch(SessionEvent::HistoryFetched(history.history));

        let replaced = fetched > before;
        if replaced {
            info!(
                "Replaced local history of session {} ({} -> {} messages)",
                session_id,
                before,
                fetched
            );
        }
        Ok(replaced)
    }

    /// Deletes the session on the server and, only if that succeeds, resets the
    /// local conversation. Without an active session there is nothing to do.
    pub async fn clear_session(&mut self) -> bool {
        let Some(session_id) = self.session.session_id.clone() else {
            debug!("No active session to clear");
            return true;
        };

        match self.api.delete_session(&session_id).await {
            Ok(()) => {
                self.dispatch(SessionEvent::Cleared);
                info!("Cleared session {}", session_id);
                true
            }
            Err(e) => {
                warn!("Failed to clear session {}: {}", session_id, e);
                false
            }
        }
    }

    pub fn export_text(&self) -> Result<String, ExportError> {
        export::render(&self.session.messages)
    }

    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        export::write_to_dir(&self.session.messages, dir, Local::now())
    }
}
