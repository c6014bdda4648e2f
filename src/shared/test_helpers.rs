#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::stations::models::{
    EntityKind, Locality, NewStation, Province, StationFilter, StationWithPlace,
};
#[cfg(test)]
use crate::features::stations::services::{format_code, StationStore, WriteBatch};
#[cfg(test)]
use crate::shared::text::contains_folded;

#[cfg(test)]
#[derive(Default)]
struct MemoryState {
    counters: HashMap<&'static str, i64>,
    provinces: Vec<Province>,
    localities: Vec<Locality>,
    stations: Vec<NewStation>,
    commits: usize,
    fail_commits: bool,
}

/// In-memory [`StationStore`] for service and router tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStationStore {
    state: Mutex<MemoryState>,
}

#[cfg(test)]
#[allow(dead_code)]
impl MemoryStationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate committed rows, as a previous run would have left them
    pub fn seed(&self, batch: WriteBatch) {
        let mut state = self.state.lock().unwrap();
        state.provinces.extend(batch.provinces);
        state.localities.extend(batch.localities);
        state.stations.extend(batch.stations);
    }

    /// Make every following commit fail with a database error
    pub fn fail_commits(&self) {
        self.state.lock().unwrap().fail_commits = true;
    }

    pub fn provinces(&self) -> Vec<Province> {
        self.state.lock().unwrap().provinces.clone()
    }

    pub fn localities(&self) -> Vec<Locality> {
        self.state.lock().unwrap().localities.clone()
    }

    pub fn stations(&self) -> Vec<NewStation> {
        self.state.lock().unwrap().stations.clone()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }
}

#[cfg(test)]
fn codes(state: &MemoryState, kind: EntityKind) -> Vec<&str> {
    match kind {
        EntityKind::Province => state.provinces.iter().map(|p| p.code.as_str()).collect(),
        EntityKind::Locality => state.localities.iter().map(|l| l.code.as_str()).collect(),
        EntityKind::Station => state.stations.iter().map(|s| s.code.as_str()).collect(),
    }
}

#[cfg(test)]
#[async_trait]
impl StationStore for MemoryStationStore {
    async fn max_numeric_code(&self, kind: EntityKind) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(codes(&state, kind)
            .into_iter()
            .filter_map(|code| code.parse::<i64>().ok())
            .max()
            .unwrap_or(0))
    }

    async fn sync_counter(&self, kind: EntityKind, floor: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let value = state.counters.entry(kind.counter_key()).or_insert(0);
        *value = (*value).max(floor);
        Ok(())
    }

    async fn next_code(&self, kind: EntityKind) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let value = state.counters.entry(kind.counter_key()).or_insert(0);
        *value += 1;
        Ok(format_code(kind, *value))
    }

    async fn find_province_by_name(&self, name: &str) -> Result<Option<Province>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .provinces
            .iter()
            .find(|p| p.name.to_lowercase() == name.to_lowercase())
            .cloned())
    }

    async fn find_locality(
        &self,
        name: &str,
        province_names: &[String],
    ) -> Result<Option<Locality>> {
        let state = self.state.lock().unwrap();
        let in_scope = |province_code: &str| {
            state.provinces.iter().any(|p| {
                p.code == province_code
                    && province_names
                        .iter()
                        .any(|n| n.to_lowercase() == p.name.to_lowercase())
            })
        };
        Ok(state
            .localities
            .iter()
            .filter(|l| l.name == name && in_scope(&l.province_code))
            .min_by(|a, b| a.code.cmp(&b.code))
            .cloned())
    }

    async fn station_exists(&self, region: &str, key: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stations
            .iter()
            .any(|s| s.source_region == region && s.source_key.as_deref() == Some(key)))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_commits {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        for province in batch.provinces {
            state.provinces.retain(|p| p.code != province.code);
            state.provinces.push(province);
        }
        for locality in batch.localities {
            state.localities.retain(|l| l.code != locality.code);
            state.localities.push(locality);
        }
        state.stations.extend(batch.stations);
        state.commits += 1;
        Ok(())
    }

    async fn clear(&self, kind: EntityKind, page_size: i64) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let page = usize::try_from(page_size).unwrap_or(1).max(1);
        let mut deleted = 0u64;
        loop {
            let removed = match kind {
                EntityKind::Province => {
                    let n = state.provinces.len().min(page);
                    state.provinces.drain(..n).count()
                }
                EntityKind::Locality => {
                    let n = state.localities.len().min(page);
                    state.localities.drain(..n).count()
                }
                EntityKind::Station => {
                    let n = state.stations.len().min(page);
                    state.stations.drain(..n).count()
                }
            };
            if removed == 0 {
                break;
            }
            deleted += removed as u64;
        }
        state.counters.insert(kind.counter_key(), 0);
        Ok(deleted)
    }

    async fn search_stations(&self, filter: &StationFilter) -> Result<Vec<StationWithPlace>> {
        let state = self.state.lock().unwrap();
        let mut results = Vec::new();

        for station in &state.stations {
            let Some(locality) = state
                .localities
                .iter()
                .find(|l| l.code == station.locality_code)
            else {
                continue;
            };
            let Some(province) = state
                .provinces
                .iter()
                .find(|p| p.code == locality.province_code)
            else {
                continue;
            };

            if let Some(wanted) = &filter.locality {
                if !contains_folded(&locality.name, wanted) {
                    continue;
                }
            }
            if let Some(wanted) = &filter.postal_code {
                if &station.postal_code != wanted {
                    continue;
                }
            }
            if let Some(wanted) = &filter.province {
                if !contains_folded(&province.name, wanted) {
                    continue;
                }
            }
            if filter.station_type.is_some_and(|t| t != station.station_type) {
                continue;
            }

            results.push(StationWithPlace {
                code: station.code.clone(),
                name: station.name.clone(),
                station_type: station.station_type,
                address: station.address.clone(),
                postal_code: station.postal_code.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                description: station.description.clone(),
                schedule: station.schedule.clone(),
                contact: station.contact.clone(),
                url: station.url.clone(),
                locality_code: locality.code.clone(),
                locality_name: locality.name.clone(),
                province_code: province.code.clone(),
                province_name: province.name.clone(),
                source_region: station.source_region.clone(),
                created_at: chrono::Utc::now(),
            });
        }

        results.sort_by(|a, b| a.code.cmp(&b.code));
        results.truncate(usize::try_from(filter.limit).unwrap_or(0));
        Ok(results)
    }
}
