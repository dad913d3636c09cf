//! hacid-kgd: serves the knowledge-graph HTTP API.
//!
//! Configuration comes from the TOML file named by `HACID_KG_CONFIG` (if
//! set), then `HACID_KG_BIND`, `HACID_KG_PORT`, `HACID_KG_ENDPOINT` and
//! `HACID_KG_TASKS_FILE`.
//!
//! Build and run: `cargo run --bin hacid-kgd`

use std::path::PathBuf;
use std::sync::Arc;

use hacid_kg::config::{CONFIG_ENV, ServiceConfig};
use hacid_kg::endpoint::{RemoteEndpoint, SparqlEndpoint};
use hacid_kg::server::{AppState, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info")),
        )
        .init();

    // ── Configuration ──
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let mut config = ServiceConfig::load_or_default(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    if let Err(e) = config.apply_process_env() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    // ── State ──
    let endpoint: Arc<dyn SparqlEndpoint> = Arc::new(RemoteEndpoint::new(&config.endpoint));
    let state = AppState::new(&config, endpoint).unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1);
    });
    tracing::info!(
        endpoint = %config.endpoint.url,
        tasks_file = %config.server.tasks_file.display(),
        "hacid-kgd initialized"
    );

    // ── Serve ──
    let app = router(Arc::new(state));
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        tracing::error!("failed to bind {addr}: {e}");
        std::process::exit(1);
    });
    tracing::info!("listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to register SIGTERM handler: {e}");
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    tracing::info!("hacid-kgd shutting down");
}
