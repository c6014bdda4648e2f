use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::regions::dtos::SearchQuery;
use crate::features::search::dtos::AggregateSearchResponse;
use crate::features::search::services::AggregatorService;

/// Search every region at once
///
/// Regions that fail or time out are left out of the results.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Stations from every reachable region", body = AggregateSearchResponse),
        (status = 400, description = "Unknown station type")
    ),
    tag = "search"
)]
pub async fn search_all(
    State(service): State<Arc<AggregatorService>>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<AggregateSearchResponse>> {
    let response = service.search(&query).await?;
    Ok(Json(response))
}
