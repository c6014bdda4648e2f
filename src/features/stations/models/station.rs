use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

use crate::shared::constants::{LOCALITY_CODE_WIDTH, PROVINCE_CODE_WIDTH, STATION_CODE_WIDTH};
use crate::shared::text::fold;

/// Station type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "station_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    Fixed,
    Mobile,
}

impl StationType {
    /// Lenient parse of a user supplied filter ("fija", "Estación Móvil", "mobile", ...)
    pub fn parse_filter(value: &str) -> Option<Self> {
        let folded = fold(value);
        if folded.is_empty() {
            return None;
        }
        if ["movil", "mobil", "mobile"].iter().any(|k| folded.contains(k)) {
            Some(StationType::Mobile)
        } else if ["fij", "fix"].iter().any(|k| folded.contains(k)) {
            Some(StationType::Fixed)
        } else {
            None
        }
    }
}

impl std::fmt::Display for StationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationType::Fixed => write!(f, "fixed"),
            StationType::Mobile => write!(f, "mobile"),
        }
    }
}

/// Entity kinds that draw codes from a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Province,
    Locality,
    Station,
}

impl EntityKind {
    /// Key of the kind's row in `id_counters`
    pub fn counter_key(&self) -> &'static str {
        match self {
            EntityKind::Province => "provinces",
            EntityKind::Locality => "localities",
            EntityKind::Station => "stations",
        }
    }

    pub fn code_width(&self) -> usize {
        match self {
            EntityKind::Province => PROVINCE_CODE_WIDTH,
            EntityKind::Locality => LOCALITY_CODE_WIDTH,
            EntityKind::Station => STATION_CODE_WIDTH,
        }
    }
}

/// Database model for province
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Province {
    pub code: String,
    pub name: String,
}

/// Database model for locality
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Locality {
    pub code: String,
    pub name: String,
    pub province_code: String,
}

/// Data for inserting a station
#[derive(Debug, Clone, PartialEq)]
pub struct NewStation {
    pub code: String,
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
    pub source_region: String,
    pub source_key: Option<String>,
}

/// Station joined with its locality and province names
#[derive(Debug, Clone, FromRow)]
pub struct StationWithPlace {
    pub code: String,
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
    pub locality_name: String,
    pub province_code: String,
    pub province_name: String,
    pub source_region: String,
    pub created_at: DateTime<Utc>,
}

/// Filters for the persisted-store search
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub province: Option<String>,
    pub station_type: Option<StationType>,
    pub limit: i64,
}
