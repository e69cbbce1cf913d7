pub mod calendly;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod widget;

use calendly::CalendlyClient;
use cli::Args;
use config::RelayConfig;
use log::info;
use relay::RelayService;
use server::{ resolve_tls, Server };
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = RelayConfig::from_args(&args)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Relay Route: {}", config.route);
    info!("Chat LLM Type: {}", config.llm.llm_type);
    info!("Chat Model: {}", config.llm.model());
    info!("Chat Endpoint: {}", config.llm.endpoint());
    info!("API Key Configured: {}", config.api_configured());
    info!("Max Tokens: {}", config.llm.max_tokens);
    info!("Temperature: {}", config.llm.temperature);
    info!("Upstream Timeout: {}s", config.llm.timeout.as_secs());
    info!("History Window: {}", config.history_window);
    info!("Max Message Chars: {}", config.max_message_chars);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Contact Phone: {}", args.contact_phone);
    info!("Booking Links: {}", config.booking_links.len());
    info!("Calendly Configured: {}", config.calendly.configured());
    info!("-------------------------");

    let tls = resolve_tls(&args)?;
    let calendly = CalendlyClient::from_config(&config.calendly)?;
    let relay = RelayService::new(config)?;
    let server = Server::new(&args.server_addr, relay, calendly, tls)?;
    server.run().await?;

    Ok(())
}
