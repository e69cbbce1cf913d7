//! Read-only proxy for the broker's Calendly event types, so the site can
//! list booking options without holding the Calendly token.

use std::time::Duration;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::ConfigError;
use crate::models::calendly::EventType;

pub const DEFAULT_CALENDLY_BASE_URL: &str = "https://api.calendly.com";
pub const CALENDLY_NOT_CONFIGURED: &str = "Calendly API key or user URI not configured";
pub const CALENDLY_FETCH_FAILED: &str = "Failed to fetch Calendly events";

#[derive(Debug, Clone, PartialEq)]
pub struct CalendlyConfig {
    pub api_key: Option<String>,
    /// e.g. `https://api.calendly.com/users/USER_ID`
    pub user_uri: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CalendlyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            user_uri: None,
            base_url: DEFAULT_CALENDLY_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl CalendlyConfig {
    fn credentials(&self) -> Option<(&str, &str)> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let user_uri = self.user_uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some((api_key, user_uri))
    }

    pub fn configured(&self) -> bool {
        self.credentials().is_some()
    }

    /// `<base>/event_types?user=<uri>`
    pub fn endpoint(&self, user_uri: &str) -> Result<Url, ConfigError> {
        let mut endpoint = Url::parse(&format!("{}/event_types", self.base_url.trim_end_matches('/')))?;
        endpoint.query_pairs_mut().append_pair("user", user_uri);
        Ok(endpoint)
    }
}

#[derive(Debug, Error)]
pub enum CalendlyError {
    #[error("{}", CALENDLY_NOT_CONFIGURED)]
    NotConfigured,
    #[error("Calendly request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl CalendlyError {
    /// What the site is told; request failures never expose their cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            CalendlyError::NotConfigured => CALENDLY_NOT_CONFIGURED,
            CalendlyError::Request(_) => CALENDLY_FETCH_FAILED,
        }
    }
}

#[derive(Deserialize)]
struct EventTypeCollection {
    #[serde(default)]
    collection: Vec<EventType>,
}

#[derive(Clone)]
pub struct CalendlyClient {
    http: HttpClient,
    endpoint: Url,
}

impl CalendlyClient {
    /// Returns `None` when either the token or the user URI is missing.
    pub fn from_config(config: &CalendlyConfig) -> Result<Option<Self>, ConfigError> {
        let Some((api_key, user_uri)) = config.credentials() else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| ConfigError::InvalidApiKey(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Some(Self { http, endpoint: config.endpoint(user_uri)? }))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One GET, no retry. Non-2xx and undecodable bodies are errors.
    pub async fn event_types(&self) -> Result<Vec<EventType>, CalendlyError> {
        debug!("Fetching Calendly event types from {}", self.endpoint);

        let body: EventTypeCollection = self.http.get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body.collection)
    }
}
