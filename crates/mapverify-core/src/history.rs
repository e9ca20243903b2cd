//! Run history used for regression analysis and benchmark trends.
//!
//! The store is read once before regression analysis and appended once after
//! a run. Implementations assume a single writer; concurrent pipeline runs
//! against the same store may lose records.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::grade::Grade;
use crate::pipeline::{PipelineStatus, SuiteName};

/// Number of records a store keeps by default.
pub const DEFAULT_RETENTION: usize = 100;

/// What one pipeline run leaves behind for later comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub execution_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: PipelineStatus,
    pub overall_grade: Grade,
    pub overall_score: f64,
    /// Score of every suite that completed.
    pub suite_scores: BTreeMap<SuiteName, f64>,
    /// Operation name → mean time in ms, when the performance suite ran.
    #[serde(default)]
    pub benchmark_means: BTreeMap<String, f64>,
    #[serde(default)]
    pub dataset_fingerprint: String,
}

/// Persistent, append-only run history, oldest record first.
pub trait HistoryStore {
    /// Returns every retained record, oldest first.
    fn load(&self) -> Result<Vec<HistoryRecord>, PersistenceError>;

    /// Appends `record`, dropping the oldest records beyond the retention cap.
    fn append(&mut self, record: HistoryRecord) -> Result<(), PersistenceError>;
}

/// Drops the oldest records so that at most `retention` remain.
pub fn retain_newest(records: &mut Vec<HistoryRecord>, retention: usize) {
    if records.len() > retention {
        let excess = records.len() - retention;
        records.drain(..excess);
    }
}

/// In-memory [`HistoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryHistoryStore {
    records: Vec<HistoryRecord>,
    retention: usize,
}

impl MemoryHistoryStore {
    /// An empty store with the default retention.
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// An empty store keeping at most `retention` records.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            records: Vec::new(),
            retention,
        }
    }

    /// A store pre-seeded with `records` (oldest first).
    pub fn from_records(mut records: Vec<HistoryRecord>) -> Self {
        retain_newest(&mut records, DEFAULT_RETENTION);
        Self {
            records,
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryRecord>, PersistenceError> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: HistoryRecord) -> Result<(), PersistenceError> {
        self.records.push(record);
        retain_newest(&mut self.records, self.retention);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn record(id: &str, scores: &[(SuiteName, f64)]) -> HistoryRecord {
    HistoryRecord {
        execution_id: id.to_owned(),
        timestamp: DateTime::<Utc>::UNIX_EPOCH,
        status: PipelineStatus::Passed,
        overall_grade: Grade::A,
        overall_score: 90.0,
        suite_scores: scores.iter().copied().collect(),
        benchmark_means: BTreeMap::new(),
        dataset_fingerprint: String::new(),
    }
}
