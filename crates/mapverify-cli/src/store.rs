//! Filesystem-backed history and artifact stores.
use std::path::{Path, PathBuf};

use mapverify_core::history::retain_newest;
use mapverify_core::{
    ArtifactSink, DEFAULT_RETENTION, HistoryRecord, HistoryStore, PersistenceError,
};

/// Run history kept as a pretty-printed JSON array, oldest record first.
///
/// A missing file reads as an empty history. Every append rewrites the whole
/// file; a single writer is assumed.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    path: PathBuf,
    retention: usize,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Keeps at most `retention` records.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }
}

impl HistoryStore for JsonFileHistory {
    fn load(&self) -> Result<Vec<HistoryRecord>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PersistenceError::Read {
                    artifact: self.label(),
                    detail: e.to_string(),
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Read {
            artifact: self.label(),
            detail: e.to_string(),
        })
    }

    fn append(&mut self, record: HistoryRecord) -> Result<(), PersistenceError> {
        let mut records = self.load()?;
        records.push(record);
        retain_newest(&mut records, self.retention);

        let bytes =
            serde_json::to_vec_pretty(&records).map_err(|source| PersistenceError::Serialize {
                artifact: self.label(),
                source,
            })?;
        if let Some(parent) = self.path.parent() {
            create_dir(parent)?;
        }
        std::fs::write(&self.path, bytes).map_err(|e| PersistenceError::Write {
            artifact: self.label(),
            detail: e.to_string(),
        })?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "history saved");
        Ok(())
    }
}

/// Writes each artifact as a file in one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryArtifacts {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ArtifactSink for DirectoryArtifacts {
    fn write(&mut self, name: &str, contents: &[u8]) -> Result<(), PersistenceError> {
        if name.contains(['/', '\\']) || name == ".." {
            return Err(PersistenceError::Write {
                artifact: name.to_owned(),
                detail: "artifact names must be plain file names".to_owned(),
            });
        }
        create_dir(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, contents).map_err(|e| PersistenceError::Write {
            artifact: path.display().to_string(),
            detail: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "artifact written");
        self.written.push(path);
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<(), PersistenceError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| PersistenceError::Write {
        artifact: dir.display().to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::collections::BTreeMap;

    use chrono::{TimeZone as _, Utc};
    use mapverify_core::{Grade, PipelineStatus, SuiteName};

    use super::*;

    fn record(id: &str, score: f64) -> HistoryRecord {
        HistoryRecord {
            execution_id: id.to_owned(),
            timestamp: Utc
                .with_ymd_and_hms(2025, 1, 31, 9, 15, 2)
                .single()
                .expect("valid date"),
            status: PipelineStatus::Passed,
            overall_grade: Grade::A,
            overall_score: score,
            suite_scores: BTreeMap::from([(SuiteName::Connectivity, score)]),
            benchmark_means: BTreeMap::new(),
            dataset_fingerprint: String::new(),
        }
    }

    #[test]
    fn missing_history_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileHistory::new(dir.path().join("test-history.json"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn append_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("test-history.json");
        let mut store = JsonFileHistory::new(&path);
        store.append(record("run-1", 95.0)).expect("append");
        store.append(record("run-2", 90.0)).expect("append");

        let reopened = JsonFileHistory::new(&path);
        let records = reopened.load().expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].execution_id, "run-1");
        assert_eq!(records[1].overall_score, 90.0);
    }

    #[test]
    fn append_drops_oldest_beyond_retention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store =
            JsonFileHistory::new(dir.path().join("history.json")).with_retention(2);
        for i in 0..4 {
            store.append(record(&format!("run-{i}"), 100.0)).expect("append");
        }
        let ids: Vec<_> = store
            .load()
            .expect("load")
            .into_iter()
            .map(|r| r.execution_id)
            .collect();
        assert_eq!(ids, ["run-2", "run-3"]);
    }

    #[test]
    fn corrupt_history_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not an array").expect("write");
        let err = JsonFileHistory::new(&path).load().expect_err("should fail");
        assert!(matches!(err, PersistenceError::Read { .. }));
    }

    #[test]
    fn directory_artifacts_writes_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("test-results");
        let mut sink = DirectoryArtifacts::new(&out);
        sink.write("pipeline-report-x.md", b"# Report\n").expect("write");

        assert_eq!(sink.written().len(), 1);
        let text = std::fs::read_to_string(out.join("pipeline-report-x.md")).expect("read");
        assert_eq!(text, "# Report\n");
    }

    #[test]
    fn artifact_names_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = DirectoryArtifacts::new(dir.path());
        let err = sink.write("../escape.json", b"{}").expect_err("should fail");
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
