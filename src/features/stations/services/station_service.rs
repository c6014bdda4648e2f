use std::sync::Arc;

use crate::core::error::Result;
use crate::features::stations::dtos::{StationResponseDto, StationsQuery, StationsResponseDto};
use crate::features::stations::services::StationStore;

/// Read side of the persisted stations
pub struct StationService {
    store: Arc<dyn StationStore>,
}

impl StationService {
    pub fn new(store: Arc<dyn StationStore>) -> Self {
        Self { store }
    }

    /// Search loaded stations joined with their locality and province
    pub async fn search(&self, query: StationsQuery) -> Result<StationsResponseDto> {
        let filter = query.into_filter()?;
        let stations: Vec<StationResponseDto> = self
            .store
            .search_stations(&filter)
            .await?
            .into_iter()
            .map(StationResponseDto::from)
            .collect();

        Ok(StationsResponseDto {
            count: stations.len(),
            stations,
        })
    }
}
