use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use docdex_core::persist::{load_index, IndexPaths};
use docdex_core::{Hit, IndexState, QueryMode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub mode: QueryMode,
}
fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: IndexState,
}

/// Load the index and assemble the router. A missing or corrupt artifact is
/// not fatal: the server starts degraded with search disabled so static
/// content stays reachable behind it.
pub fn build_app(index_dir: &str) -> Router {
    let paths = IndexPaths::new(index_dir);
    let index = match load_index(&paths) {
        Ok(index) => {
            tracing::info!(num_docs = index.meta.num_docs, "index loaded");
            IndexState::built(index)
        }
        Err(err) => {
            tracing::warn!(%err, "index unavailable, search disabled");
            IndexState::Unbuilt
        }
    };
    let state = AppState { index };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = if state.index.is_built() { "ok" } else { "degraded" };
    Json(json!({ "status": status }))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let hits = state
        .index
        .search(&params.q, params.mode)
        .map_err(|err| (StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;

    let total_hits = hits.len();
    let k = params.k.clamp(1, 100);
    let results: Vec<Hit> = hits.into_iter().take(k).collect();

    Ok(Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<u32>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let index = state
        .index
        .get()
        .map_err(|err| (StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;
    let meta = index
        .doc(doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document {doc_id}")))?;
    Ok(Json(json!({
        "doc_id": doc_id,
        "external_id": meta.external_id,
        "title": meta.title,
        "path": meta.path,
        "sections": meta.sections,
    })))
}
