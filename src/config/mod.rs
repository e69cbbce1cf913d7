pub mod prompt;

use std::time::Duration;
use thiserror::Error;
use log::{ info, warn };

use crate::calendly::CalendlyConfig;
use crate::cli::Args;
use crate::llm::{ LlmConfig, LlmType };
use crate::models::status::RatesResponse;
use crate::relay::booking::{ parse_booking_links, BookingLink };
use self::prompt::{ load_prompts, PromptConfig, PromptError, DEFAULT_CONTACT_PHONE };

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured for the chat provider")]
    MissingApiKey,
    #[error("API key cannot be sent as a header: {0}")]
    InvalidApiKey(String),
    #[error("invalid chat provider: {0}")]
    UnsupportedProvider(String),
    #[error("invalid chat endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid booking link '{0}', expected label=url")]
    InvalidBookingLink(String),
    #[error("relay route must start with '/': {0}")]
    InvalidRoute(String),
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("failed to load prompts from '{path}': {source}")]
    Prompt {
        path: String,
        #[source]
        source: PromptError,
    },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Everything the relay needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub route: String,
    pub history_window: usize,
    pub max_message_chars: usize,
    pub prompts: PromptConfig,
    pub booking_links: Vec<BookingLink>,
    pub rates: RatesResponse,
    pub llm: LlmConfig,
    pub calendly: CalendlyConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            route: "/chatbot-api".to_string(),
            history_window: 6,
            max_message_chars: 500,
            prompts: PromptConfig::default().with_phone(DEFAULT_CONTACT_PHONE),
            booking_links: Vec::new(),
            rates: RatesResponse {
                fixed_rate: None,
                variable_rate: None,
                three_year_fixed_rate: None,
            },
            llm: LlmConfig::default(),
            calendly: CalendlyConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !args.relay_route.starts_with('/') {
            return Err(ConfigError::InvalidRoute(args.relay_route.clone()));
        }
        if args.history_window == 0 {
            return Err(ConfigError::ZeroLimit("history window"));
        }
        if args.max_message_chars == 0 {
            return Err(ConfigError::ZeroLimit("max message chars"));
        }
        if args.upstream_timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit("upstream timeout"));
        }

        let llm_type: LlmType = args.chat_llm_type
            .parse()
            .map_err(|e: crate::llm::ParseLlmTypeError| ConfigError::UnsupportedProvider(e.to_string()))?;

        let prompts = match &args.prompts_path {
            Some(path) =>
                load_prompts(path).map_err(|source| ConfigError::Prompt {
                    path: path.clone(),
                    source,
                })?,
            None => {
                info!("No prompts file configured, using built-in prompts");
                PromptConfig::default()
            }
        };

        let booking_links = match &args.booking_links {
            Some(raw) => parse_booking_links(raw)?,
            None => Vec::new(),
        };

        let api_key = args.api_key();
        if api_key.is_none() {
            warn!("CHAT_API_KEY not found in environment variables");
        }

        let llm = LlmConfig {
            llm_type,
            api_key,
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
            max_tokens: args.chat_max_tokens,
            temperature: args.chat_temperature,
            timeout: Duration::from_secs(args.upstream_timeout_secs),
        };
        // Fail on a malformed endpoint at startup rather than on the first chat.
        url::Url::parse(llm.endpoint())?;

        let calendly = CalendlyConfig {
            api_key: args.calendly_api_key.clone(),
            user_uri: args.calendly_user_uri.clone(),
            base_url: args.calendly_base_url.clone(),
            ..CalendlyConfig::default()
        };
        calendly.endpoint("")?;

        Ok(Self {
            route: args.relay_route.clone(),
            history_window: args.history_window,
            max_message_chars: args.max_message_chars,
            prompts: prompts.with_phone(&args.contact_phone),
            booking_links,
            rates: RatesResponse {
                fixed_rate: args.fixed_rate,
                variable_rate: args.variable_rate,
                three_year_fixed_rate: args.three_year_fixed_rate,
            },
            llm,
            calendly,
        })
    }

    pub fn api_configured(&self) -> bool {
        self.llm.api_key.is_some()
    }
}
