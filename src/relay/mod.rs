//! The chat relay: validate, shape history, call the provider once, and
//! normalize whatever happens into a [`RelayResponse`].
//!
//! The service keeps no conversation state. Everything it forwards
//! arrives in the request body.

pub mod booking;

use axum::http::StatusCode;
use chrono::{ SecondsFormat, Utc };
use log::{ info, warn, error };
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ ConfigError, RelayConfig };
use crate::llm::chat::{ new_client, ChatClient, UpstreamError };
use crate::models::chat::ChatTurn;
use crate::models::relay::RelayResponse;
use self::booking::{ booking_reply, is_booking_request };

pub const INVALID_INPUT: &str = "Invalid input";
pub const MESSAGE_TOO_LONG: &str = "Message too long";
pub const API_KEY_NOT_CONFIGURED: &str = "API key not configured";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{}", INVALID_INPUT)]
    InvalidInput,
    #[error("{}", MESSAGE_TOO_LONG)]
    MessageTooLong,
    #[error("{}", API_KEY_NOT_CONFIGURED)]
    NotConfigured,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput | RelayError::MessageTooLong => StatusCode::BAD_REQUEST,
            RelayError::NotConfigured | RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The string a customer sees. Upstream failures never leak their
    /// cause; they map to one of the two configured fallbacks.
    pub fn public_message(&self, config: &RelayConfig) -> String {
        match self {
            RelayError::Upstream(e) if e.is_shape() => config.prompts.processing_error.clone(),
            RelayError::Upstream(_) => config.prompts.connection_error.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

/// Parses and checks a raw request body.
pub fn validate_request(
    body: &[u8],
    max_message_chars: usize,
    history_window: usize
) -> Result<ValidatedRequest, RelayError> {
    let mut fields = match serde_json::from_slice::<JsonValue>(body) {
        Ok(JsonValue::Object(fields)) => fields,
        _ => {
            return Err(RelayError::InvalidInput);
        }
    };

    let message = match fields.remove("message") {
        Some(JsonValue::String(message)) => message,
        _ => {
            return Err(RelayError::InvalidInput);
        }
    };
    let message = message.trim();
    if message.is_empty() {
        return Err(RelayError::InvalidInput);
    }
    if message.chars().count() > max_message_chars {
        return Err(RelayError::MessageTooLong);
    }

    let history = match fields.remove("history") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(entries)) => shape_history(&entries, history_window),
        Some(_) => {
            return Err(RelayError::InvalidInput);
        }
    };

    Ok(ValidatedRequest { message: message.to_string(), history })
}

/// Keeps the trailing `window` entries, then drops any without a string
/// `role` and `content`. Survivors keep their relative order.
pub fn shape_history(entries: &[JsonValue], window: usize) -> Vec<ChatTurn> {
    let start = entries.len().saturating_sub(window);
    entries[start..]
        .iter()
        .filter_map(|entry| {
            let role = entry.get("role")?.as_str()?;
            let content = entry.get("content")?.as_str()?;
            Some(ChatTurn::new(role, content))
        })
        .collect()
}

/// `[system] + history + [user message]`
pub fn assemble_messages(system_prompt: &str, history: &[ChatTurn], message: &str) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn::system(system_prompt));
    messages.extend(history.iter().cloned());
    messages.push(ChatTurn::user(message));
    messages
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Clone)]
pub struct RelayService {
    config: Arc<RelayConfig>,
    upstream: Option<Arc<dyn ChatClient>>,
}

impl RelayService {
    /// Builds the provider client from `config`. A missing API key is not
    /// an error here: the service starts and answers every chat with the
    /// not-configured error.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let upstream = match new_client(&config.llm) {
            Ok(client) => {
                info!(
                    "Chat client configured: Type={}, Model={}, Endpoint={}",
                    config.llm.llm_type,
                    client.get_model(),
                    client.get_base_url()
                );
                Some(client)
            }
            Err(ConfigError::MissingApiKey) => {
                error!("Chat provider API key missing; relay requests will fail until it is set");
                None
            }
            Err(e) => {
                return Err(e);
            }
        };
        Ok(Self::with_client(config, upstream))
    }

    pub fn with_client(config: RelayConfig, upstream: Option<Arc<dyn ChatClient>>) -> Self {
        Self { config: Arc::new(config), upstream }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn api_configured(&self) -> bool {
        self.upstream.is_some()
    }

    /// Handles one relay request end to end. Always returns a well-formed
    /// envelope.
    pub async fn relay(&self, body: &[u8]) -> (StatusCode, RelayResponse) {
        let request_id = Uuid::new_v4();

        match self.try_relay(request_id, body).await {
            Ok(reply) => {
                info!("[{}] relay ok ({} chars)", request_id, reply.chars().count());
                (StatusCode::OK, RelayResponse::success(reply, now_iso8601()))
            }
            Err(e) => {
                match &e {
                    RelayError::Upstream(cause) => error!("[{}] upstream failed: {}", request_id, cause),
                    RelayError::NotConfigured => error!("[{}] rejected: {}", request_id, e),
                    _ => warn!("[{}] rejected: {}", request_id, e),
                }
                (e.status_code(), RelayResponse::error(e.public_message(&self.config)))
            }
        }
    }

    async fn try_relay(&self, request_id: Uuid, body: &[u8]) -> Result<String, RelayError> {
        let upstream = self.upstream.as_ref().ok_or(RelayError::NotConfigured)?;

        let request = validate_request(
            body,
            self.config.max_message_chars,
            self.config.history_window
        )?;

        if !self.config.booking_links.is_empty() && is_booking_request(&request.message) {
            info!("[{}] booking request answered with configured links", request_id);
            return Ok(booking_reply(&self.config.booking_links));
        }

        let messages = assemble_messages(
            &self.config.prompts.system_prompt,
            &request.history,
            &request.message
        );
        info!("[{}] forwarding {} messages upstream", request_id, messages.len());

        let reply = upstream.complete_chat(&messages).await?;
        Ok(reply.trim().to_string())
    }
}
