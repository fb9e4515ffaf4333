//! Modal Solver HTTP Server

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use modal_solver::prelude::*;
use modal_solver::records::{self, IdGenerator};

const DEFAULT_PORT: u16 = 8086;

/// Row and run IDs shared by all requests
#[derive(Debug, Clone, Default)]
struct SharedIds(Arc<AtomicU64>);

impl IdGenerator for SharedIds {
    fn next_id(&mut self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Clone, Default)]
struct AppState {
    runs: SharedIds,
    rows: SharedIds,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct ModalRequest {
    model: ModelInput,
    #[serde(default)]
    options: Option<ModalOptions>,
}

#[derive(Debug, Serialize)]
struct ModalResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<RunRecord>,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn modal(
    State(state): State<AppState>,
    Json(request): Json<ModalRequest>,
) -> impl IntoResponse {
    let mut run_ids = state.runs.clone();
    let run_id = run_ids.next_id();
    let mut row_ids = state.rows.clone();
    let options = request.options.unwrap_or_default();

    // The eigensolve is CPU-bound
    let task = tokio::task::spawn_blocking(move || {
        records::execute(&request.model, &options, run_id, &mut row_ids)
    });

    match task.await {
        Ok(run) => {
            let (status, error) = match &run.status {
                RunStatus::Failed(message) => (StatusCode::BAD_REQUEST, Some(message.clone())),
                _ => (StatusCode::OK, None),
            };
            (
                status,
                Json(ModalResponse {
                    success: error.is_none(),
                    error,
                    run: Some(run),
                }),
            )
        }
        Err(e) => {
            error!("Run {} aborted: {}", run_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ModalResponse {
                    success: false,
                    error: Some(format!("analysis task failed: {}", e)),
                    run: None,
                }),
            )
        }
    }
}

fn port_from_env() -> anyhow::Result<u16> {
    match std::env::var("MODAL_SERVER_PORT") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("MODAL_SERVER_PORT is not a valid port: {}", value)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/modal", post(modal))
        .with_state(AppState::default())
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port_from_env()?));
    info!("Modal Solver Server listening on http://{}", addr);
    println!("Modal Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Modal:        POST /api/v1/modal");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
