use std::path::Path;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::normalization::services::{DuplicateTracker, StationNamer};
use crate::features::normalization::FieldNormalizer;
use crate::features::regions::dtos::{HealthResponse, SearchQuery, StationView};
use crate::features::regions::models::{RawRecord, Region};
use crate::features::regions::services::SourceReader;

/// Read-side service over the regions' source files
pub struct RegionService {
    reader: Arc<SourceReader>,
}

fn display_path(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

impl RegionService {
    pub fn new(reader: Arc<SourceReader>) -> Self {
        Self { reader }
    }

    /// Report whether each region's source file is present
    pub async fn health(&self) -> HealthResponse {
        let mut status = HealthResponse {
            status: "ok".to_string(),
            xml_exists: false,
            xml_path: String::new(),
            csv_exists: false,
            csv_path: String::new(),
            json_exists: false,
            json_path: String::new(),
        };

        for region in Region::ALL {
            let path = self.reader.path_for(region);
            let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
            let shown = display_path(path);
            match region {
                Region::Cat => {
                    status.xml_exists = exists;
                    status.xml_path = shown;
                }
                Region::Gal => {
                    status.csv_exists = exists;
                    status.csv_path = shown;
                }
                Region::Cv => {
                    status.json_exists = exists;
                    status.json_path = shown;
                }
            }
        }

        status
    }

    /// Raw records of `region` as read, capped at `limit`.
    ///
    /// A missing or empty source is a not-found error.
    pub async fn records(&self, region: Region, limit: Option<u64>) -> Result<Vec<RawRecord>> {
        let mut records = self
            .reader
            .read(region)
            .await?
            .filter(|records| !records.is_empty())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No records could be read for {}. Does {} exist?",
                    region,
                    display_path(self.reader.path_for(region))
                ))
            })?;

        if let Some(limit) = limit {
            records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(records)
    }

    /// Stations of `region` normalized at query time and filtered by `query`.
    ///
    /// A missing source yields no results rather than an error, so the
    /// aggregate search degrades to the regions that are available.
    pub async fn search(&self, region: Region, query: &SearchQuery) -> Result<Vec<StationView>> {
        let station_type = query.station_type()?;

        let records = match self.reader.read(region).await? {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };

        let normalizer = FieldNormalizer::new(region);
        let mut duplicates = DuplicateTracker::new();
        let mut namer = StationNamer::new();
        let mut results = Vec::new();

        for (position, record) in records.iter().enumerate() {
            let index = position + 1;
            let normalized = match normalizer.normalize(index, record) {
                Ok(normalized) => normalized,
                Err(rejection) => {
                    tracing::debug!("{} search skips {}", region, rejection);
                    continue;
                }
            };

            if let Some(key) = &normalized.natural_key {
                if duplicates.check(key, index).is_some() {
                    continue;
                }
            }

            // Names are numbered over the whole source so they match the loaded ones
            let name = namer.next_name(&normalized.locality);
            if query.matches(&normalized, station_type) {
                results.push(StationView::from_normalized(name, normalized));
            }
        }

        tracing::debug!("{} search returned {} stations", region, results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SourcesConfig;
    use crate::features::stations::models::StationType;

    const GAL_CSV: &str = "NOME DA ESTACIÓN;CONCELLO;PROVINCIA;CÓDIGO POSTAL;COORDENADAS GMAPS\n\
        ITV Vigo;Vigo;Pontevedra;36210;42° 13.500', -8° 44.100'\n\
        ITV Vigo - Móvil;VIGO;Pontevedra;36214;\n\
        ITV Vigo;Vigo;Pontevedra;36210;\n\
        ITV Lugo;Lugo;Lugo;27003;\n\
        ITV Madrid;Madrid;Madrid;28001;\n";

    fn service_with(dir: &Path, gal: Option<&str>) -> RegionService {
        let gal_path = dir.join("Estacions_ITV.csv");
        if let Some(content) = gal {
            std::fs::write(&gal_path, content).unwrap();
        }
        let reader = SourceReader::new(SourcesConfig {
            cat_path: dir.join("ITV-CAT.xml"),
            gal_path,
            cv_path: dir.join("estaciones.json"),
            csv_delimiter: b';',
        });
        RegionService::new(Arc::new(reader))
    }

    #[tokio::test]
    async fn test_search_normalizes_dedupes_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(dir.path(), Some(GAL_CSV));

        let all = service.search(Region::Gal, &SearchQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Estación de Vigo");
        assert_eq!(all[1].name, "Estación de Vigo 2");
        assert_eq!(all[1].station_type, StationType::Mobile);
        assert_eq!(all[2].province, "Lugo");

        let query = SearchQuery {
            localidad: Some("VIGO".to_string()),
            tipo: Some("fija".to_string()),
            ..Default::default()
        };
        let fixed_in_vigo = service.search(Region::Gal, &query).await.unwrap();
        assert_eq!(fixed_in_vigo.len(), 1);
        assert!(fixed_in_vigo[0].latitude.is_some());

        let by_postal = SearchQuery {
            cp: Some("2700".to_string()),
            ..Default::default()
        };
        let lugo = service.search(Region::Gal, &by_postal).await.unwrap();
        assert_eq!(lugo.len(), 1);
        assert_eq!(lugo[0].locality, "Lugo");
    }

    #[tokio::test]
    async fn test_search_missing_source_is_empty_success() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(dir.path(), None);
        let results = service.search(Region::Cv, &SearchQuery::default()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_records_limit_and_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(dir.path(), Some(GAL_CSV));

        let records = service.records(Region::Gal, Some(2)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(service.records(Region::Gal, None).await.unwrap().len(), 5);

        let missing = service.records(Region::Cat, None).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_health_reports_each_source() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(dir.path(), Some(GAL_CSV));
        let health = service.health().await;
        assert_eq!(health.status, "ok");
        assert!(health.csv_exists);
        assert!(!health.xml_exists);
        assert!(!health.json_exists);
        assert!(health.csv_path.ends_with("Estacions_ITV.csv"));
    }
}
