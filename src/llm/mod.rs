pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use std::time::Duration;

/// Providers that speak the OpenAI chat-completions dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    OpenAI,
    Groq,
    DeepSeek,
    XAI,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmType::OpenAI),
            "groq" => Ok(LlmType::Groq),
            "deepseek" => Ok(LlmType::DeepSeek),
            "xai" => Ok(LlmType::XAI),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmType::OpenAI => "openai",
            LlmType::Groq => "groq",
            LlmType::DeepSeek => "deepseek",
            LlmType::XAI => "xai",
        };
        write!(f, "{}", name)
    }
}

impl LlmType {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LlmType::OpenAI => "https://api.openai.com/v1/chat/completions",
            LlmType::Groq => "https://api.groq.com/openai/v1/chat/completions",
            LlmType::DeepSeek => "https://api.deepseek.com/chat/completions",
            LlmType::XAI => "https://api.x.ai/v1/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmType::OpenAI => "gpt-3.5-turbo",
            LlmType::Groq => "llama-3.1-8b-instant",
            LlmType::DeepSeek => "deepseek-chat",
            LlmType::XAI => "grok-3-latest",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::OpenAI,
            api_key: None,
            completion_model: None,
            base_url: None,
            max_tokens: 300,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.completion_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.llm_type.default_model())
    }

    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.llm_type.default_endpoint())
    }
}
