//! PlaceFinder HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, ServerConfig, build_search_service, init_telemetry};
use presentation_http::{AppState, create_router, set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_telemetry(&config.telemetry)?;
    info!("PlaceFinder v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = &loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    info!(
        host = %config.server.host,
        port = %config.server.port,
        nominatim = %config.nominatim.base_url,
        overpass = %config.overpass.base_url,
        "Configuration loaded"
    );

    set_expose_internal_errors(config.server.expose_error_details);

    let search_service = build_search_service(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize search service: {e}"))?;

    let app = create_router(AppState::new(search_service))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(
            config.server.max_body_size_json_bytes,
        ));
    let app = if config.server.cors_enabled {
        app.layer(cors_layer(&config.server))
    } else {
        app
    };

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// CORS policy: any origin when none are configured
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!("Waiting up to {:?} for connections to close", timeout);
}
