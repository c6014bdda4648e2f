use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::loader::dtos::{
    ClearResponse, LoadRequest, LoadResponse, UploadForm, UploadReport,
};
use crate::features::loader::services::LoadJobService;
use crate::features::regions::models::Region;

/// Load one or more regions from their configured source files
#[utoipa::path(
    post,
    path = "/load",
    request_body = LoadRequest,
    responses(
        (status = 200, description = "Per-source load reports", body = LoadResponse),
        (status = 400, description = "Unknown source")
    ),
    tag = "loader"
)]
pub async fn run_load(
    State(service): State<Arc<LoadJobService>>,
    AppJson(request): AppJson<LoadRequest>,
) -> Result<Json<LoadResponse>> {
    let response = service.run(request).await?;
    Ok(Json(response))
}

/// Delete every loaded station, locality and province
#[utoipa::path(
    post,
    path = "/clear",
    responses(
        (status = 200, description = "Deleted rows per table", body = ClearResponse)
    ),
    tag = "loader"
)]
pub async fn clear(State(service): State<Arc<LoadJobService>>) -> Result<Json<ClearResponse>> {
    let response = service.clear_all().await?;
    Ok(Json(response))
}

/// Upload a source file and load it
///
/// Accepts multipart/form-data with:
/// - `archivo`: the file, in the region's own format (required)
/// - `fuente`: the region it belongs to (required)
#[utoipa::path(
    post,
    path = "/api/load",
    request_body(
        content = UploadForm,
        content_type = "multipart/form-data",
        description = "Source file and the region it belongs to",
    ),
    responses(
        (status = 200, description = "Upload load report", body = UploadReport),
        (status = 400, description = "Missing or unparseable file, or unknown region"),
        (status = 413, description = "File too large")
    ),
    tag = "loader"
)]
pub async fn upload(
    State(service): State<Arc<LoadJobService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut source: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "archivo" => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "fuente" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read fuente field: {}", e))
                })?;
                source = Some(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data = file_data
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file provided in 'archivo'".to_string()))?;
    let region = source
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("'fuente' is required".to_string()))?
        .parse::<Region>()
        .map_err(AppError::BadRequest)?;

    tracing::info!(
        "Received upload {} ({} bytes) for {}",
        file_name.as_deref().unwrap_or("unnamed"),
        file_data.len(),
        region
    );

    let report = service.ingest_upload(region, &file_data).await?;
    Ok(Json(report))
}
