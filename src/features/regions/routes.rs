use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::regions::handlers;
use crate::features::regions::services::RegionService;

/// Create routes for the per-region source services
pub fn routes(service: Arc<RegionService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/{region}/records", get(handlers::list_records))
        .route("/api/search/{region}", get(handlers::search_region))
        .with_state(service)
}
