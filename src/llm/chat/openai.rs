use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ChatClient, UpstreamError};
use crate::config::ConfigError;
use crate::llm::LlmConfig;
use crate::models::chat::ChatTurn;

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    endpoint: Url,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
}

// Every level is optional so a missing field is reported as a shape
// error instead of a serde failure.
#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Option<Vec<OpenAIChoice>>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a completion body.
pub fn parse_completion(body: &str) -> Result<String, UpstreamError> {
    let resp: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamError::Shape(format!("body is not a completion: {}", e)))?;

    resp.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| UpstreamError::Shape("missing choices[0].message.content".to_string()))
}

impl OpenAIChatClient {
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(config.endpoint())?;

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

        Ok(Self {
            http,
            model: config.model().to_string(),
            endpoint,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Self::new(api_key, config)
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete_chat(&self, messages: &[ChatTurn]) -> Result<String, UpstreamError> {
        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("Sending {} messages to {}", messages.len(), self.endpoint);

        let body = self.http.post(self.endpoint.clone())
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_completion(&body)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.endpoint.to_string()
    }
}
