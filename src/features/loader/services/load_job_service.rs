use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::core::config::LoaderConfig;
use crate::core::error::{AppError, Result};
use crate::features::loader::dtos::{ClearResponse, LoadRequest, LoadResponse, UploadReport};
use crate::features::loader::models::SourceReport;
use crate::features::loader::services::StationLoader;
use crate::features::regions::models::Region;
use crate::features::regions::services::SourceReader;
use crate::features::stations::models::EntityKind;

/// Runs load jobs: reader, normalizer and loader for each requested source
pub struct LoadJobService {
    reader: Arc<SourceReader>,
    loader: Arc<StationLoader>,
    config: LoaderConfig,
    // One job at a time, so two runs never race on the same natural keys
    running: Mutex<()>,
}

impl LoadJobService {
    pub fn new(reader: Arc<SourceReader>, loader: Arc<StationLoader>, config: LoaderConfig) -> Self {
        Self {
            reader,
            loader,
            config,
            running: Mutex::new(()),
        }
    }

    /// Load each requested source in turn. A failing source is reported and
    /// the job moves on to the next one.
    pub async fn run(&self, request: LoadRequest) -> Result<LoadResponse> {
        let regions = request.regions()?;
        let _guard = self.running.lock().await;

        if request.clear_before {
            self.clear_tables().await?;
        }

        let mut results = BTreeMap::new();
        for region in regions {
            let report = self.run_source(region).await;
            if let Some(error) = &report.error {
                tracing::error!("Load of {} failed: {}", region, error);
            }
            results.insert(region.slug().to_string(), report);
        }

        Ok(LoadResponse { results })
    }

    async fn run_source(&self, region: Region) -> SourceReport {
        let started = Instant::now();
        let elapsed = || started.elapsed().as_secs_f64();

        let records = match self.reader.read(region).await {
            Ok(Some(records)) => records,
            Ok(None) => {
                return SourceReport::failed(
                    format!(
                        "source unavailable: {}",
                        self.reader.path_for(region).display()
                    ),
                    elapsed(),
                )
            }
            Err(e) => return SourceReport::failed(e.to_string(), elapsed()),
        };

        match self.loader.load(region, &records).await {
            Ok(outcome) => SourceReport::from_outcome(&outcome, elapsed()),
            Err(e) => SourceReport::failed(e.to_string(), elapsed()),
        }
    }

    /// Parse an uploaded file as `region`'s format and load it
    pub async fn ingest_upload(&self, region: Region, bytes: &[u8]) -> Result<UploadReport> {
        let records = self.reader.parse(region, bytes).map_err(|e| {
            AppError::BadRequest(format!("Uploaded file is not a valid {} source: {}", region, e))
        })?;
        if records.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Uploaded file has no {} records",
                region
            )));
        }

        tracing::info!("Loading {} uploaded records for {}", records.len(), region);
        let _guard = self.running.lock().await;
        let outcome = self.loader.load(region, &records).await?;

        let warnings = outcome
            .log
            .iter()
            .filter(|line| line.starts_with("WARN"))
            .count();

        Ok(UploadReport {
            status: "success".to_string(),
            source: region,
            records_ok: outcome.loaded,
            records_repaired: outcome.repaired.len(),
            records_rejected: outcome.rejected.len(),
            duplicates: outcome.duplicates,
            warnings,
            repaired_details: outcome.repaired,
            rejected_details: outcome.rejected,
            log: outcome.log,
        })
    }

    /// Purge stations, localities and provinces
    pub async fn clear_all(&self) -> Result<ClearResponse> {
        let _guard = self.running.lock().await;
        let deleted_docs = self.clear_tables().await?;
        Ok(ClearResponse {
            cleared: true,
            deleted_docs,
        })
    }

    async fn clear_tables(&self) -> Result<BTreeMap<String, u64>> {
        let store = self.loader.store();
        let mut deleted = BTreeMap::new();

        // Children first so references never dangle
        for kind in [EntityKind::Station, EntityKind::Locality, EntityKind::Province] {
            let count = store.clear(kind, self.config.clear_page_size).await?;
            tracing::info!("Cleared {} rows from {}", count, kind.counter_key());
            deleted.insert(kind.counter_key().to_string(), count);
        }

        Ok(deleted)
    }
}
