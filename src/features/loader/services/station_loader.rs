use std::sync::Arc;

use crate::core::config::LoaderConfig;
use crate::core::error::Result;
use crate::features::loader::models::{LoadOutcome, RecordDetail};
use crate::features::loader::services::{EntityResolver, GeocodingService};
use crate::features::normalization::models::{CoordinateSource, NormalizedRecord};
use crate::features::normalization::services::{
    station_description, DuplicateTracker, StationNamer,
};
use crate::features::normalization::FieldNormalizer;
use crate::features::regions::models::{RawRecord, Region};
use crate::features::stations::models::NewStation;
use crate::features::stations::services::{StationStore, WriteBatch};

/// Writes normalized records of one region into the station store
pub struct StationLoader {
    store: Arc<dyn StationStore>,
    config: LoaderConfig,
    geocoder: Option<Arc<GeocodingService>>,
}

impl StationLoader {
    pub fn new(
        store: Arc<dyn StationStore>,
        config: LoaderConfig,
        geocoder: Option<Arc<GeocodingService>>,
    ) -> Self {
        Self {
            store,
            config,
            geocoder,
        }
    }

    pub fn store(&self) -> &Arc<dyn StationStore> {
        &self.store
    }

    /// Normalize and persist `records` of `region`.
    ///
    /// Rejected and duplicate records are skipped and reported; the run goes
    /// on. A failed commit aborts the run with the database error.
    pub async fn load(&self, region: Region, records: &[RawRecord]) -> Result<LoadOutcome> {
        let normalizer = FieldNormalizer::new(region);
        let profile = normalizer.profile();
        let mut resolver = EntityResolver::new(self.store.clone());
        resolver.seed_counters().await?;

        let mut outcome = LoadOutcome {
            processed: records.len(),
            ..Default::default()
        };
        let mut duplicates = DuplicateTracker::new();
        let mut namer = StationNamer::new();
        let mut batch = WriteBatch::default();

        outcome.note(format!(
            "Loading {} records from {}",
            records.len(),
            region.display_name()
        ));

        for (position, record) in records.iter().enumerate() {
            let index = position + 1;

            let mut normalized = match normalizer.normalize(index, record) {
                Ok(normalized) => normalized,
                Err(rejection) => {
                    tracing::error!(
                        "{} {} | raw: {}",
                        region,
                        rejection,
                        serde_json::to_string(record).unwrap_or_default()
                    );
                    outcome.note(format!("ERROR {}", rejection));
                    outcome.rejected.push(RecordDetail {
                        index,
                        name: normalizer.natural_key(record),
                        messages: vec![rejection.reason],
                    });
                    continue;
                }
            };

            if let Some(key) = normalized.natural_key.clone() {
                if let Some(first) = duplicates.check(&key, index) {
                    tracing::warn!(
                        "{} record {}: duplicate of record {} ('{}'), skipped",
                        region,
                        index,
                        first,
                        key
                    );
                    outcome.note(format!("WARN record {}: duplicate of record {}", index, first));
                    outcome.duplicates += 1;
                    continue;
                }
                if self.store.station_exists(region.slug(), &key).await? {
                    tracing::warn!(
                        "{} record {}: station '{}' already loaded, skipped",
                        region,
                        index,
                        key
                    );
                    outcome.note(format!("WARN record {}: '{}' already loaded", index, key));
                    outcome.duplicates += 1;
                    continue;
                }
            }

            self.geocode_if_needed(&mut normalized).await;

            let province = resolver.province(&normalized.province, &mut batch).await?;
            let locality = resolver
                .locality(
                    &normalized.locality,
                    &province,
                    profile,
                    &mut batch,
                )
                .await?;
            let code = resolver.station_code().await?;
            let name = namer.next_name(&locality.name);

            for issue in &normalized.issues {
                tracing::warn!(
                    "{} record {} ({}): {}: {}",
                    region,
                    index,
                    name,
                    issue.field,
                    issue.message
                );
                outcome.note(format!(
                    "WARN record {}: {}: {}",
                    index, issue.field, issue.message
                ));
            }
            if normalized.is_repaired() {
                outcome.repaired.push(RecordDetail {
                    index,
                    name: Some(name.clone()),
                    messages: normalized
                        .issues
                        .iter()
                        .map(|i| format!("{}: {}", i.field, i.message))
                        .collect(),
                });
            }

            batch.stations.push(new_station(code, name, &locality.code, &province.name, normalized));
            outcome.loaded += 1;

            if batch.stations.len() >= self.config.batch_size {
                self.store.commit(std::mem::take(&mut batch)).await?;
                outcome.note(format!("Committed batch ending at record {}", index));
            }
        }

        self.store.commit(batch).await?;

        tracing::info!(
            "{} load finished: {} processed, {} loaded, {} rejected, {} duplicates, {} repaired",
            region,
            outcome.processed,
            outcome.loaded,
            outcome.rejected.len(),
            outcome.duplicates,
            outcome.repaired.len()
        );
        outcome.note(format!(
            "Done: {} loaded, {} rejected, {} duplicates",
            outcome.loaded,
            outcome.rejected.len(),
            outcome.duplicates
        ));

        Ok(outcome)
    }

    /// Replace fallback coordinates with a geocoded position when enabled.
    /// Geocoding failures keep the fallback.
    async fn geocode_if_needed(&self, record: &mut NormalizedRecord) {
        let Some(geocoder) = &self.geocoder else {
            return;
        };
        if record.coordinate_source.is_genuine() {
            return;
        }

        let bounds = &FieldNormalizer::new(record.region).profile().bounds;
        match geocoder.locate(record, bounds).await {
            Some(found) => {
                record.coordinates = Some(found);
                record.coordinate_source = CoordinateSource::Geocoded;
            }
            None => {
                tracing::debug!("No geocoded position for record {}", record.index);
            }
        }
    }
}

fn new_station(
    code: String,
    name: String,
    locality_code: &str,
    province_name: &str,
    record: NormalizedRecord,
) -> NewStation {
    NewStation {
        description: station_description(&name, &record.locality, province_name),
        code,
        name,
        station_type: record.station_type,
        address: record.address,
        postal_code: record.postal_code,
        latitude: record.coordinates.map(|c| c.latitude),
        longitude: record.coordinates.map(|c| c.longitude),
        schedule: record.schedule,
        contact: record.contact,
        url: record.url,
        locality_code: locality_code.to_string(),
        source_region: record.region.slug().to_string(),
        source_key: record.natural_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::core::error::AppError;
    use crate::shared::test_helpers::MemoryStationStore;

    fn records(rows: Value) -> Vec<RawRecord> {
        rows.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    fn gal_rows() -> Vec<RawRecord> {
        records(json!([
            {
                "NOME DA ESTACIÓN": "ITV Vigo",
                "CONCELLO": "Vigo",
                "PROVINCIA": "Pontevedra",
                "CÓDIGO POSTAL": "36210",
                "ENDEREZO": "Rúa Estrada 12",
                "COORDENADAS GMAPS": "42° 13.500', -8° 44.100'"
            },
            {
                "NOME DA ESTACIÓN": "ITV Lugo",
                "CONCELLO": "",
                "PROVINCIA": "Lugo",
                "CÓDIGO POSTAL": "27003"
            },
            {
                "NOME DA ESTACIÓN": "ITV Vigo Móvil",
                "CONCELLO": "VIGO",
                "PROVINCIA": "Pontevedra",
                "CÓDIGO POSTAL": "15001"
            }
        ]))
    }

    fn loader(store: Arc<MemoryStationStore>, batch_size: usize) -> StationLoader {
        StationLoader::new(
            store,
            LoaderConfig {
                batch_size,
                ..Default::default()
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_load_skips_rejected_and_writes_the_rest() {
        let store = Arc::new(MemoryStationStore::new());
        let outcome = loader(store.clone(), 500)
            .load(Region::Gal, &gal_rows())
            .await
            .unwrap();

        assert_eq!(outcome.processed, 3);
        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].index, 2);

        let stations = store.stations();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].code, "00001");
        assert_eq!(stations[0].name, "Estación de Vigo");
        assert_eq!(
            stations[0].description,
            "Estación de ITV Estación de Vigo ubicada en Vigo (Pontevedra)."
        );
        assert!(stations[0].latitude.is_some());
        assert_eq!(stations[1].name, "Estación de Vigo 2");

        // Both Vigo stations share one locality; Lugo was never created
        assert_eq!(store.localities().len(), 1);
        assert_eq!(store.provinces().len(), 1);
        assert_eq!(stations[0].locality_code, stations[1].locality_code);

        // 15001 does not belong to Pontevedra: blanked, record kept
        assert_eq!(stations[1].postal_code, "");
        assert_eq!(outcome.repaired.len(), 1);
        assert_eq!(outcome.repaired[0].index, 3);
    }

    #[tokio::test]
    async fn test_rerun_skips_loaded_stations_and_duplicates() {
        let store = Arc::new(MemoryStationStore::new());
        let loader = loader(store.clone(), 500);
        loader.load(Region::Gal, &gal_rows()).await.unwrap();

        let mut rows = gal_rows();
        rows.push(rows[0].clone());
        let second = loader.load(Region::Gal, &rows).await.unwrap();

        assert_eq!(second.loaded, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(store.stations().len(), 2);
    }

    #[tokio::test]
    async fn test_batches_commit_every_batch_size() {
        let store = Arc::new(MemoryStationStore::new());
        let rows: Vec<RawRecord> = (1..=5)
            .map(|n| {
                json!({
                    "NOME DA ESTACIÓN": format!("ITV {}", n),
                    "CONCELLO": "Ourense",
                    "PROVINCIA": "Ourense",
                    "CÓDIGO POSTAL": "32001"
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect();

        let outcome = loader(store.clone(), 2).load(Region::Gal, &rows).await.unwrap();
        assert_eq!(outcome.loaded, 5);
        // two full batches plus the remainder
        assert_eq!(store.commits(), 3);
        assert_eq!(store.stations()[4].code, "00005");
    }

    #[tokio::test]
    async fn test_failed_commit_aborts_the_run() {
        let store = Arc::new(MemoryStationStore::new());
        store.fail_commits();
        let result = loader(store, 500).load(Region::Gal, &gal_rows()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
