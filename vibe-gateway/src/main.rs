//! vibe-gateway - upstream proxy for chat, validation and speech
//!
//! Holds the provider API key (`GROQ_API_KEY`) so the mentor and the
//! browser never see it.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibe_common::config::TomlConfig;
use vibe_gateway::{build_router, AppState, GroqClient};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "vibe-gateway")]
#[command(about = "Code Vibe upstream gateway")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VIBE_GATEWAY_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vibe_gateway={0},vibe_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vibe-gateway v{}", env!("CARGO_PKG_VERSION"));

    let mut gateway = config.gateway.clone();
    if let Some(port) = args.port {
        gateway.port = port;
    }

    let upstream = GroqClient::new(&gateway, args.api_key).context("Failed to build upstream client")?;
    if !upstream.is_configured() {
        warn!("GROQ_API_KEY is not set; every upstream call will fail");
    }
    info!(
        upstream = %gateway.upstream_url,
        chat_model = %gateway.chat_model,
        speech_model = %gateway.speech_model,
        requests_per_minute = gateway.requests_per_minute,
        "Upstream configured"
    );

    let app = build_router(AppState {
        upstream: Arc::new(upstream),
        default_voice: gateway.voice.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], gateway.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
