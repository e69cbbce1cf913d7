pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::openai::OpenAIChatClient;
use crate::config::ConfigError;
use crate::models::chat::ChatTurn;

/// Why a completion could not be turned into reply text.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    /// The provider answered 2xx but the body had no reply text.
    #[error("unexpected upstream response: {0}")]
    Shape(String),
}

impl UpstreamError {
    pub fn is_shape(&self) -> bool {
        matches!(self, UpstreamError::Shape(_))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if let Some(status) = err.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the full message list in one request and returns the reply
    /// text. Implementations make a single attempt.
    async fn complete_chat(&self, messages: &[ChatTurn]) -> Result<String, UpstreamError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
