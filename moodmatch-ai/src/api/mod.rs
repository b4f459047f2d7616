//! HTTP API

pub mod analyze;
pub mod health;
pub mod queries;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use queries::query_routes;
