//! moodmatch-ai library interface
//!
//! Mood classification and track recommendation: audio decoding, feature extraction, the
//! catalog store and builder, the mood classifier, the matcher, the orchestrator and the HTTP
//! surface around it.

pub mod api;
pub mod audio;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod matcher;
pub mod orchestrator;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use orchestrator::MoodOrchestrator;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MoodOrchestrator>,
    /// Query log, when enabled
    pub db: Option<SqlitePool>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: MoodOrchestrator, db: Option<SqlitePool>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::analyze_routes())
        .merge(api::query_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
