use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A repaired or rejected record as listed in upload reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordDetail {
    /// 1-based position in the source
    pub index: usize,
    pub name: Option<String>,
    pub messages: Vec<String>,
}

/// What one pass of the loader over a source produced
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Records read from the source
    pub processed: usize,
    /// Stations written
    pub loaded: usize,
    pub rejected: Vec<RecordDetail>,
    pub repaired: Vec<RecordDetail>,
    pub duplicates: usize,
    /// Human readable run log, one line per event
    pub log: Vec<String>,
}

impl LoadOutcome {
    pub fn note(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

/// Per-source result of a load job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SourceReport {
    pub ok: bool,
    /// Wall time of the source's run
    #[schema(example = 1.42)]
    pub seconds: f64,
    pub processed: usize,
    pub loaded: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub repaired: usize,
    pub error: Option<String>,
}

impl SourceReport {
    pub fn from_outcome(outcome: &LoadOutcome, seconds: f64) -> Self {
        Self {
            ok: true,
            seconds,
            processed: outcome.processed,
            loaded: outcome.loaded,
            rejected: outcome.rejected.len(),
            duplicates: outcome.duplicates,
            repaired: outcome.repaired.len(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, seconds: f64) -> Self {
        Self {
            ok: false,
            seconds,
            processed: 0,
            loaded: 0,
            rejected: 0,
            duplicates: 0,
            repaired: 0,
            error: Some(error.into()),
        }
    }
}
