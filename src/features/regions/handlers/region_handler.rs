use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::regions::dtos::{
    HealthResponse, RecordsQuery, RegionSearchResponse, SearchQuery,
};
use crate::features::regions::models::{RawRecord, Region};
use crate::features::regions::services::RegionService;

fn parse_region(raw: &str) -> Result<Region> {
    raw.parse::<Region>()
        .map_err(|_| AppError::NotFound(format!("Unknown region '{}'", raw)))
}

/// Health check with the availability of each source file
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "regions"
)]
pub async fn health(State(service): State<Arc<RegionService>>) -> Json<HealthResponse> {
    Json(service.health().await)
}

/// Raw records of a region exactly as read from its source
#[utoipa::path(
    get,
    path = "/{region}/records",
    params(
        ("region" = String, Path, description = "Region code (cat, gal, cv)"),
        RecordsQuery
    ),
    responses(
        (status = 200, description = "Raw source records", body = Vec<serde_json::Value>),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "Unknown region or source unavailable")
    ),
    tag = "regions"
)]
pub async fn list_records(
    State(service): State<Arc<RegionService>>,
    Path(region): Path<String>,
    AppQuery(query): AppQuery<RecordsQuery>,
) -> Result<Json<Vec<RawRecord>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let region = parse_region(&region)?;
    let records = service.records(region, query.limit).await?;
    Ok(Json(records))
}

/// Search one region's stations, normalized at query time
#[utoipa::path(
    get,
    path = "/api/search/{region}",
    params(
        ("region" = String, Path, description = "Region code (cat, gal, cv)"),
        SearchQuery
    ),
    responses(
        (status = 200, description = "Matching stations", body = RegionSearchResponse),
        (status = 400, description = "Unknown station type"),
        (status = 404, description = "Unknown region")
    ),
    tag = "regions"
)]
pub async fn search_region(
    State(service): State<Arc<RegionService>>,
    Path(region): Path<String>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<RegionSearchResponse>> {
    let region = parse_region(&region)?;
    let results = service.search(region, &query).await?;
    Ok(Json(RegionSearchResponse {
        status: "success".to_string(),
        results,
    }))
}
