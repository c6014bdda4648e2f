use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};
use crate::features::loader::models::{RecordDetail, SourceReport};
use crate::features::regions::models::Region;

/// Request body of `POST /load`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoadRequest {
    /// Regions to load; empty loads all of them
    #[serde(default)]
    #[schema(example = json!(["gal", "cv"]))]
    pub sources: Vec<String>,
    /// Purge stations, localities and provinces first
    #[serde(default)]
    pub clear_before: bool,
}

impl LoadRequest {
    /// Requested regions in request order, without repeats
    pub fn regions(&self) -> Result<Vec<Region>> {
        if self.sources.is_empty() {
            return Ok(Region::ALL.to_vec());
        }

        let mut regions = Vec::new();
        for source in &self.sources {
            let region = source
                .parse::<Region>()
                .map_err(AppError::BadRequest)?;
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        Ok(regions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoadResponse {
    /// Report per region slug
    pub results: BTreeMap<String, SourceReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub cleared: bool,
    /// Deleted rows per table
    pub deleted_docs: BTreeMap<String, u64>,
}

/// Multipart form of `POST /api/load`
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Source file in the region's format
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub archivo: String,
    /// Region of the file ("cat", "GAL (Galicia)", "Comunitat Valenciana", ...)
    #[schema(example = "gal")]
    pub fuente: String,
}

/// Outcome of loading an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadReport {
    #[schema(example = "success")]
    pub status: String,
    pub source: Region,
    pub records_ok: usize,
    pub records_repaired: usize,
    pub records_rejected: usize,
    pub duplicates: usize,
    /// Number of warnings raised while loading
    pub warnings: usize,
    pub repaired_details: Vec<RecordDetail>,
    pub rejected_details: Vec<RecordDetail>,
    pub log: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_default_to_all() {
        assert_eq!(LoadRequest::default().regions().unwrap(), Region::ALL.to_vec());
    }

    #[test]
    fn test_regions_parse_and_dedupe() {
        let request = LoadRequest {
            sources: vec!["GAL".to_string(), "cv".to_string(), "Galicia".to_string()],
            clear_before: false,
        };
        assert_eq!(request.regions().unwrap(), vec![Region::Gal, Region::Cv]);

        let bad = LoadRequest {
            sources: vec!["madrid".to_string()],
            clear_before: false,
        };
        assert!(matches!(bad.regions(), Err(AppError::BadRequest(_))));
    }
}
