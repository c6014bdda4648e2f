use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::normalization::models::NormalizedRecord;
use crate::features::regions::models::Region;
use crate::features::stations::models::StationType;
use crate::shared::constants::MAX_RECORDS_LIMIT;
use crate::shared::text::contains_folded;

/// Query parameters for raw record listings
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct RecordsQuery {
    /// Maximum number of records to return (1-50000)
    #[validate(range(min = 1, max = MAX_RECORDS_LIMIT))]
    #[param(example = 50)]
    pub limit: Option<u64>,
}

/// Station search filters; every filter is optional and they combine with AND
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring of the locality
    #[param(example = "vigo")]
    pub localidad: Option<String>,
    /// Station type ("fixed"/"mobile", Spanish spellings accepted)
    #[param(example = "fija")]
    pub tipo: Option<String>,
    /// Substring of the postal code as published
    #[param(example = "362")]
    pub cp: Option<String>,
    /// Case-insensitive substring of the province as published
    #[param(example = "pontevedra")]
    pub provincia: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchQuery {
    /// Parsed `tipo`; an unrecognised type is a bad request
    pub fn station_type(&self) -> Result<Option<StationType>> {
        match non_empty(&self.tipo) {
            None => Ok(None),
            Some(raw) => StationType::parse_filter(raw)
                .map(Some)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown station type '{}'", raw))),
        }
    }

    /// Whether a normalized record passes every provided filter
    pub fn matches(&self, record: &NormalizedRecord, station_type: Option<StationType>) -> bool {
        if let Some(localidad) = non_empty(&self.localidad) {
            if !contains_folded(&record.locality, localidad) {
                return false;
            }
        }
        if let Some(cp) = non_empty(&self.cp) {
            if !record.raw_postal_code.contains(cp) {
                return false;
            }
        }
        if let Some(provincia) = non_empty(&self.provincia) {
            if !contains_folded(&record.raw_province, provincia) {
                return false;
            }
        }
        station_type.map_or(true, |t| t == record.station_type)
    }

    /// Non-empty filters as query-string pairs, for forwarding downstream
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("localidad", &self.localidad),
            ("tipo", &self.tipo),
            ("cp", &self.cp),
            ("provincia", &self.provincia),
        ]
        .into_iter()
        .filter_map(|(key, value)| non_empty(value).map(|v| (key, v)))
        .collect()
    }
}

/// A station as served by search endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationView {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub station_type: StationType,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "localidad")]
    pub locality: String,
    #[serde(rename = "codigo_postal")]
    pub postal_code: String,
    #[serde(rename = "provincia")]
    pub province: String,
    #[serde(rename = "horario")]
    pub schedule: String,
    #[serde(rename = "latitud")]
    pub latitude: Option<f64>,
    #[serde(rename = "longitud")]
    pub longitude: Option<f64>,
    pub region: Region,
}

impl StationView {
    pub fn from_normalized(name: String, record: NormalizedRecord) -> Self {
        Self {
            name,
            station_type: record.station_type,
            address: record.address,
            locality: record.locality,
            postal_code: record.postal_code,
            province: record.province,
            schedule: record.schedule,
            latitude: record.coordinates.map(|c| c.latitude),
            longitude: record.coordinates.map(|c| c.longitude),
            region: record.region,
        }
    }
}

/// Response of a single region search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionSearchResponse {
    #[schema(example = "success")]
    pub status: String,
    pub results: Vec<StationView>,
}

/// Service liveness plus availability of each region's source file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub xml_exists: bool,
    pub xml_path: String,
    pub csv_exists: bool,
    pub csv_path: String,
    pub json_exists: bool,
    pub json_path: String,
}
