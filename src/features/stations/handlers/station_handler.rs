use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::stations::dtos::{StationsQuery, StationsResponseDto};
use crate::features::stations::services::StationService;
use crate::shared::types::ApiResponse;

/// Search stations already loaded into the database
#[utoipa::path(
    get,
    path = "/api/stations",
    params(StationsQuery),
    responses(
        (status = 200, description = "Matching loaded stations", body = ApiResponse<StationsResponseDto>),
        (status = 400, description = "Invalid filter or limit")
    ),
    tag = "stations"
)]
pub async fn list_stations(
    State(service): State<Arc<StationService>>,
    AppQuery(query): AppQuery<StationsQuery>,
) -> Result<Json<ApiResponse<StationsResponseDto>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.search(query).await?;
    let total = response.count;
    Ok(Json(ApiResponse::with_total(response, total)))
}
