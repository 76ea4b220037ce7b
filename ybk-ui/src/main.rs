//! ybk-ui - Yearbook roster service
//!
//! Loads the class roster, serves the searchable/sortable/paged view over
//! HTTP, and pushes roster changes to the browser over SSE.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ybk_common::config::{BootstrapConfig, Settings, SERVICE_REQUIRED};
use ybk_common::events::EventBus;
use ybk_common::query::session::DEFAULT_DEBOUNCE;
use ybk_common::query::DEFAULT_PAGE_SIZE;
use ybk_common::{QueryEngine, QuerySession};
use ybk_ui::source::source_from_location;
use ybk_ui::{build_router, AppState, RosterStore};

const DEFAULT_PORT: u16 = 5730;
const DEFAULT_ROSTER: &str = "public/data/people.json";

/// Command-line arguments for ybk-ui
#[derive(Parser, Debug)]
#[command(name = "ybk-ui")]
#[command(about = "Yearbook roster service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "YEARBOOK_PORT")]
    port: Option<u16>,

    /// Roster JSON location (file path or http(s) URL)
    #[arg(short, long, env = "YEARBOOK_ROSTER")]
    roster: Option<String>,

    /// Bootstrap TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profiles per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Search debounce window in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let bootstrap =
        BootstrapConfig::load(args.config.as_deref()).context("Failed to load bootstrap config")?;
    let settings = Settings::from_env();

    init_tracing(&bootstrap, settings.app.debug);

    info!("Starting yearbook roster service (ybk-ui) v{}", env!("CARGO_PKG_VERSION"));

    let missing_settings = settings.missing(&SERVICE_REQUIRED);
    if missing_settings.is_empty() {
        info!("✓ Configuration complete");
    } else {
        warn!(
            "Missing environment variables: {} (running in degraded mode)",
            missing_settings.join(", ")
        );
    }

    let port = args.port.or(bootstrap.port).unwrap_or(DEFAULT_PORT);
    let roster = args
        .roster
        .or(bootstrap.roster_source)
        .unwrap_or_else(|| DEFAULT_ROSTER.to_string());
    let page_size = args
        .page_size
        .or(bootstrap.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let debounce = args
        .debounce_ms
        .or(bootstrap.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    info!("Roster source: {}", roster);
    info!("Page size: {}, debounce: {:?}", page_size, debounce);

    let events = EventBus::new(100);
    let engine = QueryEngine::new(Vec::new())
        .with_page_size(page_size)
        .with_event_bus(events.clone());
    let session = QuerySession::new(engine, debounce);
    let source = source_from_location(&roster).context("Failed to create roster source")?;
    let store = RosterStore::new(source, session, events.clone());

    // A failed initial load leaves the service up in a visible failed state
    if let Err(e) = store.load().await {
        error!("Initial roster load failed: {}", e);
    }

    let state = AppState::new(store, settings, missing_settings, events);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

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

fn init_tracing(bootstrap: &BootstrapConfig, debug: bool) {
    let default_level = if debug {
        "debug".to_string()
    } else {
        bootstrap
            .logging
            .level
            .clone()
            .unwrap_or_else(|| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ybk_ui={0},ybk_common={0},tower_http=info", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
