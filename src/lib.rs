use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod corpus;
pub mod error;
pub mod ingest;
pub mod search;

use search::{DisplayResult, Searcher};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

/// One page of results, echoing the request.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub start_rank: usize,
    pub result_size: usize,
    pub total_hits: u64,
    pub results: Vec<DisplayResult>,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    /// Zero-based rank of the first result.
    #[serde(default)]
    pub start_rank: usize,
}

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub searcher: Searcher,
}

// ============================================================================
// Router Setup
// ============================================================================

pub fn create_app(searcher: Searcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState { searcher };

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/search", get(search_documents))
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn root() -> &'static str {
    "AP89 Search API - v0.1.0"
}

async fn health_check() -> Json<Message> {
    Json(Message {
        message: "Backend is running!".to_string(),
    })
}

async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let page = state.searcher.search(&params.query, params.start_rank).await;

    Json(SearchResponse {
        query: params.query,
        start_rank: params.start_rank,
        result_size: page.results.len(),
        total_hits: page.total_hits,
        results: page.results,
    })
}
