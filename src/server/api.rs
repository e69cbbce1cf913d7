use crate::calendly::{ CalendlyClient, CalendlyError };
use crate::models::calendly::EventTypesResponse;
use crate::models::relay::RelayResponse;
use crate::models::status::{ HealthResponse, RatesResponse };
use crate::relay::RelayService;
use std::error::Error;
use std::net::SocketAddr;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::{ header::CONTENT_TYPE, Method, StatusCode },
};
use chrono::Utc;
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

use super::TlsPaths;

#[derive(Clone)]
struct AppState {
    relay: RelayService,
    calendly: Option<CalendlyClient>,
}

/// All routes of the relay server. Only the relay route gets CORS; the
/// rates, Calendly and health endpoints are read same-origin by the site.
/// Without a Calendly client the events route answers with an error.
pub fn router(relay: RelayService, calendly: Option<CalendlyClient>) -> Router {
    let route = relay.config().route.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let relay_route = post(relay_handler)
        .fallback(method_not_allowed)
        .layer(ServiceBuilder::new().layer(cors));

    Router::new()
        .route(&route, relay_route)
        .route("/api/rates", get(rates_handler))
        .route("/api/calendly-events", get(calendly_events_handler))
        .route("/health", get(health_handler))
        .fallback(not_found)
        .with_state(AppState { relay, calendly })
}

pub async fn start_http_server(
    addr: SocketAddr,
    relay: RelayService,
    calendly: Option<CalendlyClient>,
    tls: Option<TlsPaths>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(relay, calendly);

    match tls {
        Some(tls) => {
            let tls_config = axum_server::tls_rustls::RustlsConfig
                ::from_pem_file(&tls.cert_path, &tls.key_path).await
                .map_err(|e|
                    format!(
                        "Failed to load TLS certificate '{}' / key '{}': {}",
                        tls.cert_path,
                        tls.key_path,
                        e
                    )
                )?;

            info!("Starting HTTPS server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        }
        None => {
            let listener = tokio::net::TcpListener
                ::bind(addr).await
                .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;

            info!("Starting HTTP server on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

async fn relay_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let (status, response) = state.relay.relay(&body).await;
    (status, Json(response))
}

async fn rates_handler(State(state): State<AppState>) -> Json<RatesResponse> {
    Json(state.relay.config().rates.clone())
}

async fn calendly_events_handler(State(state): State<AppState>) -> Response {
    let result = match &state.calendly {
        Some(client) => client.event_types().await,
        None => Err(CalendlyError::NotConfigured),
    };

    match result {
        Ok(event_types) => Json(EventTypesResponse { event_types }).into_response(),
        Err(e) => {
            error!("Calendly API error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(RelayResponse::error(e.public_message()))).into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        api_configured: state.relay.api_configured(),
    })
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, Json(RelayResponse::error("Method not allowed")))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(RelayResponse::error("Endpoint not found")))
}
