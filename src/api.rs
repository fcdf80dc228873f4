use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::decision::{Action, RoutingConfig};
use crate::dispatch::{dispatch, Reply};
use crate::engine::SupportRouter;
use crate::error::RoutingError;
use crate::history::{History, HistoryEntry};
use crate::knowledge::KnowledgeHandle;
use crate::metrics::{record_action, record_config_error};

const HISTORY_CAP: usize = 2000;
const HISTORY_PAGE: usize = 20;

#[derive(Clone)]
pub struct AppState {
    router: SupportRouter,
    history: Arc<History>,
    knowledge_path: PathBuf,
}

impl AppState {
    pub fn new(knowledge: KnowledgeHandle, knowledge_path: impl Into<PathBuf>) -> Self {
        Self {
            router: SupportRouter::new(knowledge),
            history: Arc::new(History::with_capacity(HISTORY_CAP)),
            knowledge_path: knowledge_path.into(),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeHandle {
        self.router.knowledge()
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/route", post(route_message))
        .route("/respond", post(respond))
        .route("/debug/history", get(debug_history))
        .route("/admin/reload-knowledge", post(admin_reload_knowledge))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RouteReq {
    message: String,
    customer_id: String,
    #[serde(default)]
    config: RoutingConfig,
}

#[derive(Serialize)]
struct RespondOut {
    action: Action,
    reply: Reply,
}

/// Error body for `4xx` / `5xx` responses: `{ "error": "..." }`.
pub enum ApiError {
    BadConfig(RoutingError),
    Reload(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadConfig(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Reload(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

impl From<RoutingError> for ApiError {
    fn from(e: RoutingError) -> Self {
        record_config_error();
        warn!(error = %e, "rejected routing config");
        ApiError::BadConfig(e)
    }
}

fn decide(state: &AppState, req: &RouteReq) -> Result<Action, ApiError> {
    let action = state
        .router
        .route(&req.message, &req.customer_id, &req.config)?;
    record_action(&action);
    state.history.push(&req.message, &action);
    Ok(action)
}

async fn route_message(
    State(state): State<AppState>,
    Json(req): Json<RouteReq>,
) -> Result<Json<Action>, ApiError> {
    decide(&state, &req).map(Json)
}

async fn respond(
    State(state): State<AppState>,
    Json(req): Json<RouteReq>,
) -> Result<Json<RespondOut>, ApiError> {
    let action = decide(&state, &req)?;
    let reply = dispatch(&action, state.knowledge()).await;
    Ok(Json(RespondOut { action, reply }))
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(HISTORY_PAGE))
}

#[derive(Serialize)]
struct ReloadOut {
    status: &'static str,
    faqs: usize,
    orders: usize,
}

async fn admin_reload_knowledge(
    State(state): State<AppState>,
) -> Result<Json<ReloadOut>, ApiError> {
    state
        .knowledge()
        .reload_from(&state.knowledge_path)
        .map_err(|e| {
            warn!(
                path = %state.knowledge_path.display(),
                error = %e,
                "manual knowledge reload failed"
            );
            ApiError::Reload(e.to_string())
        })?;
    let kb = state.knowledge().snapshot();
    Ok(Json(ReloadOut {
        status: "reloaded",
        faqs: kb.faqs().len(),
        orders: kb.order_count(),
    }))
}
