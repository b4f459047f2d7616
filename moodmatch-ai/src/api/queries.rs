//! Query log endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{recent_queries, QueryLogEntry};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_QUERY_LIMIT: u32 = 20;
const MAX_QUERY_LIMIT: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct QueriesParams {
    pub limit: Option<u32>,
}

/// GET /queries?limit=N
///
/// Most recent audit records, newest first.
pub async fn list_queries(
    State(state): State<AppState>,
    Query(params): Query<QueriesParams>,
) -> ApiResult<Json<Vec<QueryLogEntry>>> {
    let Some(pool) = &state.db else {
        return Err(ApiError::Unavailable("query log is disabled".to_string()));
    };

    let limit = params.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
    if limit == 0 || limit > MAX_QUERY_LIMIT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_QUERY_LIMIT
        )));
    }

    let entries = recent_queries(pool, limit).await?;
    Ok(Json(entries))
}

/// Build query log routes
pub fn query_routes() -> Router<AppState> {
    Router::new().route("/queries", get(list_queries))
}
