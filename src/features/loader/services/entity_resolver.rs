use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::normalization::models::RegionProfile;
use crate::features::stations::models::{EntityKind, Locality, Province};
use crate::features::stations::services::{StationStore, WriteBatch};

/// Resolves provinces and localities for one load run.
///
/// Lookups go through an in-run cache first, then the store, and only then
/// allocate a new code. New entities are queued on the caller's batch so they
/// are committed together with the stations that reference them.
pub struct EntityResolver {
    store: Arc<dyn StationStore>,
    provinces: HashMap<String, Province>,
    localities: HashMap<(String, Option<String>), Locality>,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn StationStore>) -> Self {
        Self {
            store,
            provinces: HashMap::new(),
            localities: HashMap::new(),
        }
    }

    /// Raise every counter to the highest code already stored, so numbering
    /// resumes after rows written outside the counters.
    pub async fn seed_counters(&self) -> Result<()> {
        for kind in [EntityKind::Province, EntityKind::Locality, EntityKind::Station] {
            let max = self.store.max_numeric_code(kind).await?;
            self.store.sync_counter(kind, max).await?;
            tracing::debug!("Counter '{}' seeded from stored max {}", kind.counter_key(), max);
        }
        Ok(())
    }

    pub async fn province(&mut self, name: &str, batch: &mut WriteBatch) -> Result<Province> {
        if let Some(cached) = self.provinces.get(name) {
            return Ok(cached.clone());
        }

        let province = match self.store.find_province_by_name(name).await? {
            Some(stored) => stored,
            None => {
                let created = Province {
                    code: self.store.next_code(EntityKind::Province).await?,
                    name: name.to_string(),
                };
                tracing::info!("New province {} '{}'", created.code, created.name);
                batch.provinces.push(created.clone());
                created
            }
        };

        self.provinces.insert(name.to_string(), province.clone());
        Ok(province)
    }

    /// Locality by name, looked up under `province` when the profile scopes
    /// localities by province and under any of the region's provinces
    /// otherwise. A new locality always records `province` as its parent.
    pub async fn locality(
        &mut self,
        name: &str,
        province: &Province,
        profile: &RegionProfile,
        batch: &mut WriteBatch,
    ) -> Result<Locality> {
        let scoped = profile.locality_scoped_by_province;
        let key = (name.to_string(), scoped.then(|| province.code.clone()));
        if let Some(cached) = self.localities.get(&key) {
            return Ok(cached.clone());
        }

        let province_names: Vec<String> = if scoped {
            vec![province.name.clone()]
        } else {
            profile
                .provinces
                .iter()
                .map(|rule| rule.canonical.to_string())
                .collect()
        };

        let locality = match self.store.find_locality(name, &province_names).await? {
            Some(stored) => stored,
            None => {
                let created = Locality {
                    code: self.store.next_code(EntityKind::Locality).await?,
                    name: name.to_string(),
                    province_code: province.code.clone(),
                };
                tracing::info!(
                    "New locality {} '{}' in {}",
                    created.code,
                    created.name,
                    province.name
                );
                batch.localities.push(created.clone());
                created
            }
        };

        self.localities.insert(key, locality.clone());
        Ok(locality)
    }

    pub async fn station_code(&self) -> Result<String> {
        self.store.next_code(EntityKind::Station).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::regions::models::Region;
    use crate::shared::test_helpers::MemoryStationStore;

    #[tokio::test]
    async fn test_resolution_reuses_stored_and_cached_entities() {
        let store = Arc::new(MemoryStationStore::new());
        store.seed(WriteBatch {
            provinces: vec![Province {
                code: "0007".to_string(),
                name: "Lugo".to_string(),
            }],
            ..Default::default()
        });

        let mut resolver = EntityResolver::new(store.clone());
        resolver.seed_counters().await.unwrap();
        let mut batch = WriteBatch::default();

        let lugo = resolver.province("Lugo", &mut batch).await.unwrap();
        assert_eq!(lugo.code, "0007");
        assert!(batch.provinces.is_empty());

        let ourense = resolver.province("Ourense", &mut batch).await.unwrap();
        assert_eq!(ourense.code, "0008");
        let again = resolver.province("Ourense", &mut batch).await.unwrap();
        assert_eq!(again, ourense);
        assert_eq!(batch.provinces.len(), 1);
    }

    #[tokio::test]
    async fn test_scoped_localities_are_distinct_per_province() {
        let store = Arc::new(MemoryStationStore::new());
        let mut resolver = EntityResolver::new(store);
        let mut batch = WriteBatch::default();
        let cv = RegionProfile::for_region(Region::Cv);

        let valencia = resolver.province("Valencia", &mut batch).await.unwrap();
        let alicante = resolver.province("Alicante", &mut batch).await.unwrap();

        let a = resolver
            .locality("Benidorm", &valencia, cv, &mut batch)
            .await
            .unwrap();
        let b = resolver
            .locality("Benidorm", &alicante, cv, &mut batch)
            .await
            .unwrap();
        let c = resolver
            .locality("Benidorm", &alicante, cv, &mut batch)
            .await
            .unwrap();

        assert_ne!(a.code, b.code);
        assert_eq!(b, c);
        assert_eq!(b.province_code, alicante.code);
        assert_eq!(batch.localities.len(), 2);
    }

    #[tokio::test]
    async fn test_station_codes_follow_stored_max() {
        let store = Arc::new(MemoryStationStore::new());
        store.sync_counter(EntityKind::Station, 41).await.unwrap();

        let resolver = EntityResolver::new(store);
        resolver.seed_counters().await.unwrap();
        assert_eq!(resolver.station_code().await.unwrap(), "00042");
        assert_eq!(resolver.station_code().await.unwrap(), "00043");
    }

    #[tokio::test]
    async fn test_unscoped_lookup_stays_within_region_provinces() {
        let store = Arc::new(MemoryStationStore::new());
        store.seed(WriteBatch {
            provinces: vec![
                Province {
                    code: "0001".to_string(),
                    name: "Valencia".to_string(),
                },
                Province {
                    code: "0002".to_string(),
                    name: "Lugo".to_string(),
                },
            ],
            localities: vec![
                Locality {
                    code: "0001".to_string(),
                    name: "Vilanova".to_string(),
                    province_code: "0001".to_string(),
                },
                Locality {
                    code: "0002".to_string(),
                    name: "Sarria".to_string(),
                    province_code: "0002".to_string(),
                },
            ],
            ..Default::default()
        });

        let mut resolver = EntityResolver::new(store.clone());
        resolver.seed_counters().await.unwrap();
        let mut batch = WriteBatch::default();
        let gal = RegionProfile::for_region(Region::Gal);
        let lugo = resolver.province("Lugo", &mut batch).await.unwrap();

        // Same name stored under a Valencian province: a new Galician locality
        let vilanova = resolver
            .locality("Vilanova", &lugo, gal, &mut batch)
            .await
            .unwrap();
        assert_eq!(vilanova.code, "0003");
        assert_eq!(vilanova.province_code, "0002");

        // Stored under a Galician province, found even from another one
        let ourense = resolver.province("Ourense", &mut batch).await.unwrap();
        let sarria = resolver
            .locality("Sarria", &ourense, gal, &mut batch)
            .await
            .unwrap();
        assert_eq!(sarria.code, "0002");
        assert_eq!(batch.localities.len(), 1);
    }
}
