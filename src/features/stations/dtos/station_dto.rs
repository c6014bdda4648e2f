use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::stations::models::{StationFilter, StationType, StationWithPlace};
use crate::shared::constants::{DEFAULT_STATIONS_LIMIT, MAX_STATIONS_LIMIT};

/// Filters for searching loaded stations
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
pub struct StationsQuery {
    /// Substring of the locality name
    #[param(example = "vigo")]
    pub localidad: Option<String>,
    /// Exact postal code
    #[param(example = "36214")]
    pub cp: Option<String>,
    /// Province name, exact or substring
    #[param(example = "Pontevedra")]
    pub provincia: Option<String>,
    /// Station type ("fixed"/"mobile", Spanish spellings accepted)
    pub tipo: Option<String>,
    /// Maximum number of stations (default 500, max 2000)
    #[validate(range(min = 1, max = MAX_STATIONS_LIMIT))]
    pub limit: Option<i64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl StationsQuery {
    /// Convert into a store filter; an unrecognised type is a bad request
    pub fn into_filter(self) -> Result<StationFilter> {
        let station_type = match non_empty(self.tipo) {
            None => None,
            Some(raw) => Some(StationType::parse_filter(&raw).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown station type '{}'", raw))
            })?),
        };

        Ok(StationFilter {
            locality: non_empty(self.localidad),
            postal_code: non_empty(self.cp),
            province: non_empty(self.provincia),
            station_type,
            limit: self.limit.unwrap_or(DEFAULT_STATIONS_LIMIT),
        })
    }
}

/// A loaded station with its place names
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StationResponseDto {
    #[schema(example = "00012")]
    pub code: String,
    #[schema(example = "Estación de Vigo 2")]
    pub name: String,
    pub station_type: StationType,
    pub address: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub schedule: String,
    pub contact: String,
    pub url: String,
    pub locality_code: String,
    pub locality: String,
    pub province_code: String,
    pub province: String,
    #[schema(example = "gal")]
    pub source_region: String,
    /// When the load that stored the station ran
    pub loaded_at: DateTime<Utc>,
}

impl From<StationWithPlace> for StationResponseDto {
    fn from(s: StationWithPlace) -> Self {
        Self {
            code: s.code,
            name: s.name,
            station_type: s.station_type,
            address: s.address,
            postal_code: s.postal_code,
            latitude: s.latitude,
            longitude: s.longitude,
            description: s.description,
            schedule: s.schedule,
            contact: s.contact,
            url: s.url,
            locality_code: s.locality_code,
            locality: s.locality_name,
            province_code: s.province_code,
            province: s.province_name,
            source_region: s.source_region,
            loaded_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StationsResponseDto {
    pub count: usize,
    pub stations: Vec<StationResponseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_filter_defaults_and_blanks() {
        let filter = StationsQuery {
            localidad: Some(" ".to_string()),
            cp: Some("36214".to_string()),
            tipo: Some("móvil".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.locality, None);
        assert_eq!(filter.postal_code.as_deref(), Some("36214"));
        assert_eq!(filter.station_type, Some(StationType::Mobile));
        assert_eq!(filter.limit, DEFAULT_STATIONS_LIMIT);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let query = StationsQuery {
            tipo: Some("hovercraft".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_limit_bounds() {
        let ok = StationsQuery {
            limit: Some(2_000),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_many = StationsQuery {
            limit: Some(2_001),
            ..Default::default()
        };
        assert!(too_many.validate().is_err());
    }
}
