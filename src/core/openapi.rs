use utoipa::{Modify, OpenApi};

use crate::features::loader::{
    dtos as loader_dtos, handlers as loader_handlers, models as loader_models,
};
use crate::features::regions::{
    dtos as regions_dtos, handlers as regions_handlers, models as regions_models,
};
use crate::features::search::{dtos as search_dtos, handlers as search_handlers};
use crate::features::stations::{
    dtos as stations_dtos, handlers as stations_handlers, models as stations_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Regions
        regions_handlers::health,
        regions_handlers::list_records,
        regions_handlers::search_region,
        // Aggregate search
        search_handlers::search_all,
        // Stations
        stations_handlers::list_stations,
        // Loader
        loader_handlers::run_load,
        loader_handlers::clear,
        loader_handlers::upload,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Regions
            regions_models::Region,
            regions_dtos::StationView,
            regions_dtos::RegionSearchResponse,
            regions_dtos::HealthResponse,
            // Aggregate search
            search_dtos::AggregateSearchResponse,
            // Stations
            stations_models::StationType,
            stations_dtos::StationResponseDto,
            stations_dtos::StationsResponseDto,
            ApiResponse<stations_dtos::StationsResponseDto>,
            // Loader
            loader_models::SourceReport,
            loader_models::RecordDetail,
            loader_dtos::LoadRequest,
            loader_dtos::LoadResponse,
            loader_dtos::ClearResponse,
            loader_dtos::UploadForm,
            loader_dtos::UploadReport,
        )
    ),
    tags(
        (name = "regions", description = "Per-region source files: health, raw records and query-time search"),
        (name = "search", description = "Search across every region service"),
        (name = "stations", description = "Stations loaded into the database"),
        (name = "loader", description = "Load jobs, uploads and clearing"),
    ),
    info(
        title = "ITV Directory API",
        version = "0.1.0",
        description = "Vehicle inspection stations of Catalonia, Galicia and the Valencian Community",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
