use serde::Serialize;
use utoipa::ToSchema;

use crate::features::regions::models::Region;
use crate::features::stations::models::StationType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Provenance of a record's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSource {
    /// Parsed from the record itself
    Source,
    /// Centroid of the municipality from the static table
    MunicipalityTable,
    /// Resolved through the geocoding service
    Geocoded,
    None,
}

impl CoordinateSource {
    /// True when the position came from the record rather than a fallback
    pub fn is_genuine(&self) -> bool {
        matches!(self, CoordinateSource::Source | CoordinateSource::Geocoded)
    }
}

/// A field that was repaired (blanked, padded, defaulted) rather than rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecordIssue {
    pub field: &'static str,
    pub message: String,
}

/// A source record mapped onto the canonical station fields
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// 1-based position in the source
    pub index: usize,
    pub region: Region,
    pub natural_key: Option<String>,
    pub province: String,
    /// Province text exactly as published
    pub raw_province: String,
    pub locality: String,
    pub address: String,
    /// Empty when missing or blanked
    pub postal_code: String,
    /// Postal code text exactly as published
    pub raw_postal_code: String,
    pub coordinates: Option<Coordinates>,
    pub coordinate_source: CoordinateSource,
    pub station_type: StationType,
    pub schedule: String,
    pub contact: String,
    pub url: String,
    pub issues: Vec<RecordIssue>,
}

impl NormalizedRecord {
    pub fn is_repaired(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Note a field that was repaired instead of rejecting the record
    pub fn repair(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(RecordIssue {
            field,
            message: message.into(),
        });
    }
}

/// Why a record produced no station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecordRejection {
    pub index: usize,
    pub reason: String,
}

impl std::fmt::Display for RecordRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {}: {}", self.index, self.reason)
    }
}
