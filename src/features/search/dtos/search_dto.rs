use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::regions::dtos::StationView;

/// Merged result of searching every configured region service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateSearchResponse {
    #[schema(example = "success")]
    pub status: String,
    pub total_results: usize,
    pub results: Vec<StationView>,
}

impl AggregateSearchResponse {
    pub fn success(results: Vec<StationView>) -> Self {
        Self {
            status: "success".to_string(),
            total_results: results.len(),
            results,
        }
    }
}
