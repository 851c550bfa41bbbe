//! Binary entrypoint for the catalog HTTP server.
//!
//! Configuration comes from the environment (see [`ServerConfig`]):
//! - `GM_DB_PATH`: SQLite database file path (default: "genetic_method.db")
//! - `GM_PORT`: server listen port (default: "3000")
//! - `GM_SEED_PATH`: JSON snapshot applied before serving, if set

use std::process;

use gm_server::config::ServerConfig;
use gm_server::router::build_router;
use gm_server::service::Snapshot;
use gm_server::state::AppState;

fn load_snapshot(path: &std::path::Path) -> Result<Snapshot, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read seed file {}: {}", path.display(), e))?;
    Snapshot::from_json(&raw).map_err(|e| format!("invalid seed file {}: {}", path.display(), e))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(2);
        }
    };

    let state = match AppState::new(&config.db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("failed to open catalog at {}: {}", config.db_path, e);
            process::exit(1);
        }
    };

    if let Some(path) = &config.seed_path {
        match load_snapshot(path) {
            Ok(snapshot) => {
                let report = state.service.lock().await.apply_snapshot(&snapshot);
                tracing::info!(
                    "seeded from {}: {} applied, {} skipped",
                    path.display(),
                    report.applied,
                    report.skipped
                );
            }
            Err(e) => {
                tracing::error!("{}", e);
                process::exit(1);
            }
        }
    }

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("catalog server starting on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("cannot bind {}: {}", addr, e);
            process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
        process::exit(1);
    }
}
