pub mod cache;
pub mod jobs;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::auth::{hash_token, require_api_token};
use crate::routes::AppState;

pub fn router(state: AppState, api_token: Option<&str>) -> Router {
    let token_hash: Option<Arc<str>> = api_token.map(|t| Arc::from(hash_token(t)));

    let protected = Router::new()
        // Search
        .route("/jobs", get(jobs::search))
        // Cache
        .route("/cache", get(cache::stats).delete(cache::clear))
        .route("/cache/sweep", post(cache::sweep))
        .layer(middleware::from_fn_with_state(token_hash, require_api_token))
        .with_state(state);

    Router::new().nest("/api/v1", protected)
}
