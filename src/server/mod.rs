pub mod api;

use crate::calendly::CalendlyClient;
use crate::cli::Args;
use crate::relay::RelayService;
use std::error::Error;
use std::net::SocketAddr;
use log::{ info, error };

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

/// Picks the certificate pair out of the arguments. TLS must be either
/// fully configured or off.
pub fn resolve_tls(args: &Args) -> Result<Option<TlsPaths>, Box<dyn Error + Send + Sync>> {
    if !args.enable_tls {
        info!("TLS not enabled. Serving plain HTTP.");
        return Ok(None);
    }
    match (&args.tls_cert_path, &args.tls_key_path) {
        (Some(cert_path), Some(key_path)) => {
            info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
            Ok(
                Some(TlsPaths {
                    cert_path: cert_path.clone(),
                    key_path: key_path.clone(),
                })
            )
        }
        (Some(_), None) | (None, Some(_)) => {
            error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
            Err("Missing TLS certificate or key path".into())
        }
        (None, None) => {
            error!("--enable-tls was set but no certificate/key paths provided.");
            Err("TLS enabled without cert/key".into())
        }
    }
}

pub struct Server {
    addr: SocketAddr,
    relay: RelayService,
    calendly: Option<CalendlyClient>,
    tls: Option<TlsPaths>,
}

impl Server {
    pub fn new(
        addr: &str,
        relay: RelayService,
        calendly: Option<CalendlyClient>,
        tls: Option<TlsPaths>
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", addr, e))?;
        Ok(Self { addr, relay, calendly, tls })
    }

    pub async fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(self.addr, self.relay, self.calendly, self.tls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn tls_needs_both_paths() {
        let args = Args::parse_from(["mortgage-chat-relay", "--enable-tls", "--tls-cert-path", "cert.pem"]);
        assert!(resolve_tls(&args).is_err());

        let args = Args::parse_from([
            "mortgage-chat-relay",
            "--enable-tls",
            "--tls-cert-path",
            "cert.pem",
            "--tls-key-path",
            "key.pem",
        ]);
        let tls = resolve_tls(&args).unwrap().unwrap();
        assert_eq!(tls.key_path, "key.pem");
    }

    #[test]
    fn tls_paths_are_ignored_when_disabled() {
        let args = Args::parse_from(["mortgage-chat-relay", "--tls-cert-path", "cert.pem"]);
        assert!(resolve_tls(&args).unwrap().is_none());
    }
}
