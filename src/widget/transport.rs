use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::relay::{ RelayRequest, RelayResponse };

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay answered HTTP {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
    },
    #[error("relay answered with an unexpected body: {0}")]
    Body(String),
}

/// How the widget reaches the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Returns the assistant reply text.
    async fn send(&self, request: &RelayRequest) -> Result<String, TransportError>;
}

pub struct HttpRelayTransport {
    http: HttpClient,
    endpoint: Url,
}

impl HttpRelayTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &RelayRequest) -> Result<String, TransportError> {
        let resp = self.http.post(self.endpoint.clone()).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let parsed: RelayResponse = serde_json
            ::from_str(&body)
            .map_err(|e| TransportError::Body(e.to_string()))?;

        match parsed {
            RelayResponse::Error { error } =>
                Err(TransportError::Rejected { status: status.as_u16(), message: error }),
            RelayResponse::Success { .. } if !status.is_success() =>
                Err(TransportError::Rejected {
                    status: status.as_u16(),
                    message: "success body with error status".to_string(),
                }),
            RelayResponse::Success { message, .. } => Ok(message),
        }
    }
}
