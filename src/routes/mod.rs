pub mod api;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::collectors::runner::JobFetcher;

/// Shared state handed to every API handler.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<JobFetcher>,
    pub default_host: Arc<str>,
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub fn router(state: AppState, api_token: Option<&str>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(api::router(state, api_token))
}
