//! vibe-mentor - Code Vibe tutoring session service
//!
//! Hosts one tutoring session and exposes it over HTTP + SSE to the
//! presentation layer. Remote critique and speech go through vibe-gateway.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibe_common::config::TomlConfig;
use vibe_common::events::EventBus;
use vibe_common::Catalog;
use vibe_mentor::api::{build_router, AppContext};
use vibe_mentor::critique::GatewayCritiqueClient;
use vibe_mentor::platform::BrowserBridge;
use vibe_mentor::speech::GatewaySpeechClient;
use vibe_mentor::{spawn_session, SessionDeps};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "vibe-mentor")]
#[command(about = "Code Vibe tutoring session service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VIBE_MENTOR_PORT")]
    port: Option<u16>,

    /// Base URL of vibe-gateway (overrides the config file)
    #[arg(long, env = "VIBE_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter
    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vibe_mentor={0},vibe_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vibe-mentor v{}", env!("CARGO_PKG_VERSION"));

    let mut mentor = config.mentor.clone();
    if let Some(port) = args.port {
        mentor.port = port;
    }
    if let Some(url) = args.gateway_url {
        mentor.gateway_url = url;
    }
    info!("Gateway: {}", mentor.gateway_url);

    let catalog = match &mentor.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };
    let catalog = Arc::new(catalog);
    info!(lessons = catalog.lessons.len(), badges = catalog.badges.len(), "Catalog ready");

    let events = EventBus::new(mentor.event_capacity);
    let bridge = Arc::new(BrowserBridge::new(events.clone()));

    let critique = GatewayCritiqueClient::new(mentor.gateway_url.clone(), mentor.request_timeout())
        .context("Failed to build critique client")?;
    let speech = GatewaySpeechClient::new(mentor.gateway_url.clone(), mentor.request_timeout())
        .context("Failed to build speech client")?;

    let session = spawn_session(SessionDeps {
        catalog: catalog.clone(),
        tuning: config.feedback.clone(),
        critique: Arc::new(critique),
        speech: Arc::new(speech),
        platform: bridge.platform(),
        events: events.clone(),
    });

    let app = build_router(AppContext {
        session,
        catalog,
        events,
        bridge,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], mentor.port));
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

/// Graceful shutdown signal handler
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
