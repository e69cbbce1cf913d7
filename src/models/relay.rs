use serde::{ Serialize, Deserialize };

use super::chat::ChatTurn;

/// Body the widget posts to the relay.
///
/// The relay reads the raw body itself so that it can tell a malformed
/// request apart from a missing field; this type is what the widget
/// serializes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// The only two shapes the relay ever answers with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Success {
        success: bool,
        message: String,
        timestamp: String,
    },
    Error {
        error: String,
    },
}

impl RelayResponse {
    pub fn success(message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        RelayResponse::Success {
            success: true,
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        RelayResponse::Error { error: error.into() }
    }
}
