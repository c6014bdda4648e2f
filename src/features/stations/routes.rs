use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stations::handlers;
use crate::features::stations::services::StationService;

/// Create routes for the loaded-stations search
pub fn routes(service: Arc<StationService>) -> Router {
    Router::new()
        .route("/api/stations", get(handlers::list_stations))
        .with_state(service)
}
