use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::normalization::models::{BoundingBox, Coordinates, NormalizedRecord};

/// Nominatim search hit; only the position is used
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    pub lat: String,
    pub lon: String,
    pub display_name: Option<String>,
}

/// Service for geocoding station addresses using Nominatim
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_interval: config.min_interval,
            last_request: Mutex::new(None),
        })
    }

    /// Free-form queries tried in order for a station
    pub fn queries_for(record: &NormalizedRecord) -> Vec<String> {
        let region = record.region.display_name();
        let mut queries = Vec::new();

        if !record.address.is_empty() {
            queries.push(join_parts(&[
                &record.address,
                &record.locality,
                &record.postal_code,
                region,
                "España",
            ]));
        }
        queries.push(join_parts(&[&record.locality, &record.postal_code, "España"]));
        queries
    }

    /// First hit inside `bounds` among the record's queries. A failed query
    /// falls through to the next one.
    pub async fn locate(
        &self,
        record: &NormalizedRecord,
        bounds: &BoundingBox,
    ) -> Option<Coordinates> {
        for query in Self::queries_for(record) {
            let hit = match self.geocode(&query).await {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Geocoding '{}' failed: {}", query, e);
                    continue;
                }
            };

            let (Ok(latitude), Ok(longitude)) = (hit.lat.parse::<f64>(), hit.lon.parse::<f64>())
            else {
                tracing::debug!("Unparseable Nominatim position for '{}'", query);
                continue;
            };

            if bounds.contains(latitude, longitude) {
                tracing::debug!(
                    "Geocoded '{}' -> {:?} ({}, {})",
                    query,
                    hit.display_name,
                    latitude,
                    longitude
                );
                return Some(Coordinates {
                    latitude,
                    longitude,
                });
            }

            tracing::debug!(
                "Geocoded '{}' outside the {} box: ({}, {})",
                query,
                record.region,
                latitude,
                longitude
            );
        }

        None
    }

    /// Wait until `min_interval` has passed since the previous request.
    /// The lock is held while sleeping so concurrent callers queue up.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last = Some(Instant::now());
    }

    /// Geocode a raw location input using Nominatim free-form query
    pub async fn geocode(&self, query: &str) -> Result<Option<NominatimResponse>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1&countrycodes=es",
            self.base_url,
            urlencoding::encode(query)
        );

        self.wait_turn().await;
        tracing::debug!("Geocoding: {} -> {}", query, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let results: Vec<NominatimResponse> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(results.into_iter().next())
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
