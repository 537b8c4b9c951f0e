//! HTTP API for roster management and on-demand report passes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use super::pipeline::ReportPipeline;
use crate::coordination::ShutdownListener;
use crate::domain::PlayerIdentity;
use crate::error::{Result, StatsError};
use crate::persistence::RosterFile;

/// Shared state behind every route
pub struct ApiState {
    pub roster: RosterFile,
    pub pipeline: Arc<ReportPipeline>,
    /// Whether passes triggered over HTTP post to the webhook
    pub post_reports: bool,
    run_lock: Mutex<()>,
}

impl ApiState {
    pub fn new(roster: RosterFile, pipeline: Arc<ReportPipeline>, post_reports: bool) -> Self {
        Self {
            roster,
            pipeline,
            post_reports,
            run_lock: Mutex::new(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddPlayerRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tag: Option<String>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/players", get(list_players).post(add_player))
        .route("/run-scraper", post(run_scraper))
        .route("/healthz", get(liveness))
        .layer(cors)
        .with_state(state)
}

pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    pub fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Serve until the shutdown listener fires
    pub async fn run(&self, mut shutdown: ShutdownListener) -> Result<()> {
        let app = create_router(Arc::clone(&self.state));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await
            .map_err(|e| StatsError::Internal(format!("API server error: {}", e)))?;

        info!("API server stopped");
        Ok(())
    }
}

fn error_body(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(json!({ "status": "error", "message": message.into() })),
    )
}

async fn list_players(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    match state.roster.load().await {
        Ok(roster) => (StatusCode::OK, Json(json!(roster))),
        Err(e) => {
            error!("Failed to load roster: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn add_player(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AddPlayerRequest>,
) -> impl IntoResponse {
    let (Some(name), Some(tag)) = (request.name, request.tag) else {
        return error_body(StatusCode::BAD_REQUEST, "Missing name or tag");
    };

    match state.roster.add_player(PlayerIdentity::new(name, tag)).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "success" }))),
        Err(StatsError::Validation(message)) => error_body(StatusCode::BAD_REQUEST, message),
        Err(e) => {
            error!("Failed to save roster: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn run_scraper(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let _guard = state.run_lock.lock().await;

    let roster = match state.roster.load().await {
        Ok(roster) => roster,
        Err(e) => {
            error!("Failed to load roster: {}", e);
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    info!("Report pass requested over HTTP for {} player(s)", roster.len());
    let run = state
        .pipeline
        .run(&roster.players(), Utc::now(), state.post_reports)
        .await;
    (StatusCode::OK, Json(json!(run.reports)))
}

async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}
