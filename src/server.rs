use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::service::LongestTdService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LongestTdService>,
}

pub fn router(service: Arc<LongestTdService>) -> Router {
    Router::new()
        .route("/", get(longest_tds))
        .route("/clear-cache", get(clear_cache))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { service })
}

pub async fn serve(addr: SocketAddr, service: Arc<LongestTdService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("longest touchdowns service listening on {addr}");
    axum::serve(listener, router(service))
        .await
        .context("server stopped")?;
    Ok(())
}

async fn longest_tds(State(state): State<AppState>) -> Response {
    let service = Arc::clone(&state.service);
    // Resolution makes blocking upstream calls one after another.
    match tokio::task::spawn_blocking(move || service.snapshot()).await {
        Ok(Ok(snapshot)) => Json(snapshot.as_ref()).into_response(),
        Ok(Err(err)) => {
            error!("snapshot failed: {err:#}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("{err:#}") })),
            )
                .into_response()
        }
        Err(err) => {
            error!("snapshot task aborted: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "snapshot task aborted" })),
            )
                .into_response()
        }
    }
}

async fn clear_cache(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.service.clear_cache();
    Json(json!({ "message": "Cache cleared" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
