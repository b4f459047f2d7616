//! Analysis endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::path::PathBuf;

use crate::orchestrator::AnalysisDisplay;
use crate::{ApiError, ApiResult, AppState};

/// POST /analyze request body
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Audio file to analyse; absent or null means no file chosen
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// POST /analyze
///
/// Always answers with a display state; pipeline failures are part of the payload, not an HTTP
/// error.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisDisplay>> {
    if let Some(path) = &request.path {
        if path.as_os_str().is_empty() {
            return Err(ApiError::BadRequest("path must not be empty".to_string()));
        }
    }

    let display = state.orchestrator.process(request.path.as_deref()).await;
    Ok(Json(display))
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}
