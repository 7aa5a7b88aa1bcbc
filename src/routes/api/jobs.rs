use axum::Json;
use axum::extract::{Query, State};

use crate::error::AppError;
use crate::models::filter::{FilterState, QueryFilter};
use crate::models::job::JobRecord;
use crate::routes::AppState;

/// GET /api/v1/jobs
///
/// Every filter is an optional query parameter; unrecognized values are
/// ignored rather than rejected.
pub async fn search(
    State(state): State<AppState>,
    Query(raw): Query<QueryFilter>,
) -> Result<Json<Vec<JobRecord>>, AppError> {
    let filter = FilterState::normalize(&raw, &state.default_host);
    let jobs = state.fetcher.fetch_all(&filter).await?;
    Ok(Json(jobs))
}
