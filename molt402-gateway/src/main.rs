//! moltbook gateway HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p molt402-gateway --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p molt402-gateway
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p molt402-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `config.toml`)
//! - `HOST` — Override bind address (default: `0.0.0.0`)
//! - `PORT` — Override port (default: `4402`)
//! - `RUST_LOG` — Log level filter (default: `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use molt402_http::{
    MoltbookBridge, MoltbookClient, MoltbookPayments, MoltbookTransport, MoltbookWebhook,
};
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use molt402_gateway::config::GatewayConfig;
use molt402_gateway::handlers::{AppState, gateway_router, logging_dispatcher};

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Gateway failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::load()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        moltbook = %config.moltbook.base_url,
        auto_confirm = config.bridge.auto_confirm,
        "Loaded configuration"
    );

    let mut client = MoltbookClient::try_from(config.moltbook.base_url.as_str())?;
    if let Some(api_key) = config.moltbook.api_key() {
        client = client.with_api_key(api_key);
    } else {
        tracing::warn!("No moltbook api_key configured; requests are unauthenticated");
    }
    if let Some(timeout) = config.moltbook.timeout() {
        client = client.with_timeout(timeout);
    }
    let transport: Arc<dyn MoltbookTransport> = Arc::new(client);

    let webhook = match config.moltbook.webhook_secret() {
        Some(secret) => Some(MoltbookWebhook::new(secret)?),
        None => {
            tracing::warn!("No webhook_secret configured; /webhooks/moltbook will answer 503");
            None
        }
    };

    let state = Arc::new(AppState {
        webhook,
        dispatcher: logging_dispatcher(),
        bridge: MoltbookBridge::new(config.bridge, MoltbookPayments::new(transport)),
    });

    let app = gateway_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                if ctrl_c.await.is_err() {
                    std::future::pending::<()>().await;
                }
                tracing::info!("Received Ctrl-C, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = ctrl_c.await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
