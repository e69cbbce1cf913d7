use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    /// Route the chat relay is mounted on.
    #[arg(long, env = "RELAY_ROUTE", default_value = "/chatbot-api")]
    pub relay_route: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, groq, deepseek, xai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Chat completions endpoint of the provider. Defaults to the provider's public endpoint.
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. The relay refuses chat requests while this is empty.
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Legacy name for the chat API key, used when CHAT_API_KEY is empty.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model name for chat completion (e.g., gpt-3.5-turbo, llama-3.1-8b-instant)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on provider defaults if None
    pub chat_model: Option<String>,

    /// Upper bound on reply length, in tokens.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "300")]
    pub chat_max_tokens: u32,

    /// Sampling temperature sent with every completion request.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub chat_temperature: f32,

    /// Seconds to wait for the provider before giving up on a request.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    pub upstream_timeout_secs: u64,

    // --- Relay Args ---
    /// Number of trailing history turns forwarded to the provider.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "6")]
    pub history_window: usize,

    /// Longest accepted user message, in characters, after trimming.
    #[arg(long, env = "MAX_MESSAGE_CHARS", default_value = "500")]
    pub max_message_chars: usize,

    /// Optional JSON file overriding the built-in system prompt and fallback messages.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Phone number offered to customers when the assistant is unavailable.
    #[arg(long, env = "CONTACT_PHONE", default_value = "(604) 555-0123")]
    pub contact_phone: String,

    /// Booking links answered directly for scheduling requests, as `label=url` pairs separated by commas.
    /// Leave unset to send every message to the provider.
    #[arg(long, env = "BOOKING_LINKS")]
    pub booking_links: Option<String>,

    // --- Rates Args ---
    /// Current 5-year fixed rate shown on the site, in percent.
    #[arg(long, env = "FIXED_RATE")]
    pub fixed_rate: Option<f64>,

    /// Current variable rate shown on the site, in percent.
    #[arg(long, env = "VARIABLE_RATE")]
    pub variable_rate: Option<f64>,

    /// Current 3-year fixed rate shown on the site, in percent.
    #[arg(long, env = "THREE_YEAR_FIXED_RATE")]
    pub three_year_fixed_rate: Option<f64>,

    // --- Calendly Args ---
    /// Calendly personal access token used to list event types.
    #[arg(long, env = "CALENDLY_API_KEY", hide_env_values = true)]
    pub calendly_api_key: Option<String>,

    /// Calendly user whose event types are listed, e.g. https://api.calendly.com/users/USER_ID
    #[arg(long, env = "CALENDLY_USER_URI")]
    pub calendly_user_uri: Option<String>,

    /// Calendly API root.
    #[arg(long, env = "CALENDLY_BASE_URL", default_value = "https://api.calendly.com")]
    pub calendly_base_url: String,

    // --- TLS Args ---
    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

impl Args {
    /// The configured provider credential, if any.
    pub fn api_key(&self) -> Option<String> {
        Some(self.chat_api_key.trim())
            .filter(|k| !k.is_empty())
            .or_else(|| self.openai_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()))
            .map(str::to_string)
    }
}
