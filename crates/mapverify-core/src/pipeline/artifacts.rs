//! Where run results are written.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PersistenceError;

/// Receives named result documents.
pub trait ArtifactSink {
    /// Stores `contents` under `name`, replacing any earlier artifact of the
    /// same name.
    fn write(&mut self, name: &str, contents: &[u8]) -> Result<(), PersistenceError>;
}

/// Serializes `value` as pretty JSON and writes it to `sink`.
pub fn write_json<T: Serialize + ?Sized>(
    sink: &mut dyn ArtifactSink,
    name: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Serialize {
        artifact: name.to_owned(),
        source,
    })?;
    sink.write(name, &bytes)
}

/// Filename-safe UTC timestamp, e.g. `2025-01-31T09-15-02-417Z`.
pub fn artifact_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Keeps artifacts in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryArtifacts {
    artifacts: BTreeMap<String, Vec<u8>>,
}

impl MemoryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.artifacts.get(name).map(Vec::as_slice)
    }

    /// The first artifact whose name starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Option<(&str, &[u8])> {
        self.artifacts
            .iter()
            .find(|(name, _)| name.starts_with(prefix))
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemoryArtifacts {
    fn write(&mut self, name: &str, contents: &[u8]) -> Result<(), PersistenceError> {
        self.artifacts.insert(name.to_owned(), contents.to_vec());
        Ok(())
    }
}
