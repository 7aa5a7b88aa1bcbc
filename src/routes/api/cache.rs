use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::cache::CacheEntryInfo;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub keys: Vec<CacheEntryInfo>,
}

pub async fn stats(State(state): State<AppState>) -> Json<CacheStats> {
    let cache = state.fetcher.cache();
    Json(CacheStats {
        entries: cache.len(),
        keys: cache.entries(),
    })
}

pub async fn clear(State(state): State<AppState>) -> Json<serde_json::Value> {
    let cleared = state.fetcher.cache().clear();
    tracing::info!("Cleared {cleared} cache entries");
    Json(serde_json::json!({ "cleared": cleared }))
}

pub async fn sweep(State(state): State<AppState>) -> Json<serde_json::Value> {
    let evicted = state.fetcher.cache().sweep();
    Json(serde_json::json!({ "evicted": evicted }))
}
