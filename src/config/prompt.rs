use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

const PHONE_PLACEHOLDER: &str = "{phone}";

pub const DEFAULT_CONTACT_PHONE: &str = "(604) 555-0123";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional mortgage broker assistant for Burnaby Home Loans in Burnaby, BC, Canada.

Key Information:
- We specialize in mortgages for Burnaby and Greater Vancouver area
- Current rates: 5-year fixed ~5.5%, Variable ~5.8% (these are examples)
- We offer first-time buyer programs, refinancing, and commercial mortgages
- Popular Burnaby neighborhoods: Metrotown, Brentwood, Deer Lake, Burnaby Heights
- We work with all major Canadian banks and credit unions

Guidelines:
- Be helpful, professional, and knowledgeable about mortgages
- Provide accurate Canadian mortgage information
- Encourage users to apply for pre-approval or contact us
- If asked about specific rates, mention they change daily and recommend getting a current quote
- Keep responses concise but informative (under 200 words)
- Always maintain a professional, trustworthy tone
- If you don't know something specific, recommend they speak with our mortgage specialists

Remember: You represent a professional mortgage brokerage. Be helpful but always recommend speaking with our licensed mortgage professionals for personalized advice.";

pub const DEFAULT_CONNECTION_ERROR: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment, or call us at {phone} for immediate assistance.";

pub const DEFAULT_PROCESSING_ERROR: &str =
    "Sorry, I'm having trouble processing your request. Please try again or contact us directly.";

pub const DEFAULT_CLIENT_FALLBACK: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment, or feel free to call us at {phone} for immediate assistance.";

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Hi there! I'm your personal mortgage AI Chat Agent :) <br>Would you like to see how much you qualify for today? Or is there something else I can help you with?";

#[derive(Debug)]
pub enum PromptError {
    EmptySystemPrompt,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptySystemPrompt => write!(f, "Prompt file has an empty system_prompt"),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Static texts the relay and the widget speak with. Only the system
/// prompt is required in a prompts file; the rest fall back to the
/// built-in wording.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PromptConfig {
    pub system_prompt: String,
    #[serde(default = "default_connection_error")]
    pub connection_error: String,
    #[serde(default = "default_processing_error")]
    pub processing_error: String,
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// What the widget shows when its own request fails.
    #[serde(default = "default_client_fallback")]
    pub client_fallback: String,
}

fn default_connection_error() -> String {
    DEFAULT_CONNECTION_ERROR.to_string()
}

fn default_processing_error() -> String {
    DEFAULT_PROCESSING_ERROR.to_string()
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}

fn default_client_fallback() -> String {
    DEFAULT_CLIENT_FALLBACK.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            connection_error: default_connection_error(),
            processing_error: default_processing_error(),
            welcome_message: default_welcome_message(),
            client_fallback: default_client_fallback(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.system_prompt.trim().is_empty() {
            return Err(PromptError::EmptySystemPrompt);
        }
        Ok(())
    }

    /// Substitutes the contact phone into every text.
    pub fn with_phone(mut self, phone: &str) -> Self {
        for text in [
            &mut self.system_prompt,
            &mut self.connection_error,
            &mut self.processing_error,
            &mut self.welcome_message,
            &mut self.client_fallback,
        ] {
            *text = text.replace(PHONE_PLACEHOLDER, phone);
        }
        self
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<PromptConfig, PromptError> {
    let config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let file_content = fs::read_to_string(&path)?;
    let config = load_prompts_from_str(&file_content)?;
    info!("Loaded prompts from {}", path.as_ref().display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_substituted_into_the_connection_apology() {
        let prompts = PromptConfig::default().with_phone("(604) 555-0123");
        assert!(prompts.connection_error.contains("(604) 555-0123"));
        assert!(!prompts.connection_error.contains(PHONE_PLACEHOLDER));
    }

    #[test]
    fn phone_is_substituted_into_the_widget_fallback() {
        let prompts = PromptConfig::default().with_phone("(250) 555-9999");
        assert!(prompts.client_fallback.contains("(250) 555-9999"));
        assert!(!prompts.client_fallback.contains(DEFAULT_CONTACT_PHONE));
        assert!(!prompts.client_fallback.contains(PHONE_PLACEHOLDER));
    }

    #[test]
    fn prompts_file_only_needs_a_system_prompt() {
        let prompts = load_prompts_from_str(r#"{"system_prompt": "Be brief."}"#).unwrap();
        assert_eq!(prompts.system_prompt, "Be brief.");
        assert_eq!(prompts.processing_error, DEFAULT_PROCESSING_ERROR);
    }

    #[test]
    fn blank_system_prompt_is_rejected() {
        let err = load_prompts_from_str(r#"{"system_prompt": "   "}"#).unwrap_err();
        assert!(matches!(err, PromptError::EmptySystemPrompt));
    }

    #[test]
    fn bundled_prompts_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/json/prompts.json");
        let prompts = load_prompts(path).unwrap().with_phone("604-000-1111");
        assert!(prompts.system_prompt.contains("604-000-1111"));
        assert_eq!(prompts.welcome_message, DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn fallback_messages_are_distinct() {
        let prompts = PromptConfig::default();
        assert_ne!(prompts.connection_error, prompts.processing_error);
    }
}
