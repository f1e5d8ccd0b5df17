//! COVID web app server: run agent-based epidemic simulations from the browser.
//!
//! Exposes the RPCs the UI needs to render a parameter form, run a
//! simulation and draw its results.
//!
//! # Endpoints
//!
//! - `POST /api/rpcs`   RPC envelope; functions `get_defaults`, `get_version`,
//!   `get_sessions`, `plot_sim`
//! - `GET  /api/health` server status and request counters

mod engine;
mod normalize;
mod pipeline;
mod routes;
mod schema;
mod sessions;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;

/// Configure, run and plot epidemic simulations over RPC.
#[derive(Parser, Debug)]
#[command(name = "cw-server", version = cw_core::VERSION, about)]
struct Cli {
    /// Port to listen on.
    #[arg(default_value_t = 8188)]
    port: u16,

    /// Auto-reload flag (accepted for launcher compatibility; currently unused).
    #[arg(default_value_t = 1)]
    autoreload: u8,

    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Maximum request body size in MiB.
    #[arg(long, default_value = "16")]
    max_body_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    let state = Arc::new(AppState::bundled());

    let app = Router::new()
        .merge(routes::router())
        .layer(DefaultBodyLimit::max(mb_to_bytes(cli.max_body_mb)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    tracing::info!(
        %addr,
        autoreload = cli.autoreload,
        version = cw_core::VERSION,
        engine = %state.engine.version(),
        "cw-server starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn mb_to_bytes(mb: usize) -> usize {
    mb.saturating_mul(1024).saturating_mul(1024)
}
