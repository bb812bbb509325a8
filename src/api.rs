use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::error::SyncError;
use crate::keywords::StaticKeywords;
use crate::service::SyncService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SyncService>,
}

impl AppState {
    pub fn new(service: Arc<SyncService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/scraper/stats", get(stats))
        .route("/api/scraper/run-now", post(run_now))
        .route("/api/scraper/search-posts", post(search_posts))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

pub fn router(state: AppState) -> Router {
    create_router(state)
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(json!({ "success": false, "error": msg.into() }))).into_response()
}

fn run_error(e: SyncError) -> Response {
    match e {
        SyncError::AlreadyRunning => error_response(StatusCode::CONFLICT, e.to_string()),
        e => {
            tracing::error!(target: "api", error = %e, "sync run failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn stats(State(state): State<AppState>) -> Response {
    match state.service.stats().await {
        Ok(rate_limit) => Json(json!({
            "success": true,
            "rateLimit": rate_limit,
            "scheduler": state.service.scheduler_status(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, "reading quota stats failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn run_now(State(state): State<AppState>) -> Response {
    tracing::info!(target: "api", "manual run requested");
    match state.service.run_once().await {
        Ok(res) => Json(res).into_response(),
        Err(e) => run_error(e),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPostsReq {
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default, alias = "useClickUp")]
    use_keyword_source: bool,
}

async fn search_posts(
    State(state): State<AppState>,
    Json(body): Json<SearchPostsReq>,
) -> Response {
    let provided = StaticKeywords::from_texts(body.keywords.unwrap_or_default()).into_keywords();
    let res = if !provided.is_empty() {
        tracing::info!(target: "api", count = provided.len(), "ad-hoc search requested");
        state.service.run_with_keywords(provided).await
    } else if body.use_keyword_source {
        tracing::info!(target: "api", "search with keyword source requested");
        state.service.run_once().await
    } else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Provide a non-empty `keywords` array or set `useKeywordSource`",
        );
    };

    match res {
        Ok(r) if r.is_limit_reached() => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "success": false, "error": r.error, "stats": r.stats })),
        )
            .into_response(),
        Ok(r) => Json(r).into_response(),
        Err(e) => run_error(e),
    }
}
