//! Error taxonomy.
//!
//! Only conditions that stop work are Rust errors. Invariant violations found
//! while validating are [`crate::issue::Issue`] values instead.
//!
//! - [`StructuralError`]: the input cannot be verified at all (fatal at setup).
//! - [`ExecutionError`]: one suite failed to run; the pipeline records it and
//!   moves on unless fail-fast is set.
//! - [`PersistenceError`]: writing artifacts or history failed.
//! - [`PartitionError`]: the external partitioner failed.
//! - [`PipelineError`] and [`IntegrationError`]: what the orchestrators return.
use std::fmt;

use thiserror::Error;

use crate::integration::IntegrationRun;
use crate::pipeline::{PipelineRun, SuiteName};

/// Malformed or missing required input structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The source dataset has no `districts` list.
    #[error("source dataset is missing its districts list")]
    MissingDistricts,
    /// A district has no `locations` list.
    #[error("district {district:?} is missing its locations list")]
    MissingLocations {
        /// District id.
        district: String,
    },
    /// A location has no `rooms` list.
    #[error("location {location:?} is missing its rooms list")]
    MissingRooms {
        /// Location id.
        location: String,
    },
    /// No region bundles were supplied.
    #[error("split data contains no region bundles")]
    EmptySplit,
    /// A bundle lacks one of its required sections.
    #[error("region bundle {region:?} is missing its {section} section")]
    IncompleteBundle {
        /// Region id (the split-data key).
        region: String,
        /// `"region"`, `"locations"` or `"connections"`.
        section: &'static str,
    },
}

/// A suite could not produce a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("suite {suite} failed: {message}")]
pub struct ExecutionError {
    /// The suite that failed.
    pub suite: SuiteName,
    /// What went wrong.
    pub message: String,
    /// Whether the failure was a caught panic.
    pub panicked: bool,
}

impl ExecutionError {
    /// Constructs a non-panic [`ExecutionError`].
    pub fn new(suite: SuiteName, message: impl Into<String>) -> Self {
        Self {
            suite,
            message: message.into(),
            panicked: false,
        }
    }
}

/// Writing or reading a persisted artifact failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A value could not be serialized.
    #[error("failed to serialize {artifact}: {source}")]
    Serialize {
        /// Artifact name.
        artifact: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The sink or store rejected the write.
    #[error("failed to write {artifact}: {detail}")]
    Write {
        /// Artifact name or path.
        artifact: String,
        /// Underlying error message.
        detail: String,
    },
    /// A history document could not be read back.
    #[error("failed to read {artifact}: {detail}")]
    Read {
        /// Artifact name or path.
        artifact: String,
        /// Underlying error message.
        detail: String,
    },
}

/// The partitioner could not split the source dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("partitioning failed: {message}")]
pub struct PartitionError {
    /// What went wrong.
    pub message: String,
}

impl PartitionError {
    /// Constructs a [`PartitionError`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything that can abort a pipeline invocation.
#[derive(Error)]
pub enum PipelineError {
    /// Setup validation rejected the input; no suite ran.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// A suite failed while fail-fast was set.
    #[error("pipeline aborted: {0}")]
    Aborted(ExecutionError),
    /// Persisting results failed. The in-memory run is returned so the caller
    /// can retry.
    #[error("pipeline results were not persisted: {source}")]
    Persistence {
        /// The completed run.
        run: Box<PipelineRun>,
        /// Why persistence failed.
        #[source]
        source: PersistenceError,
    },
}

impl fmt::Debug for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural(e) => f.debug_tuple("Structural").field(e).finish(),
            Self::Aborted(e) => f.debug_tuple("Aborted").field(e).finish(),
            Self::Persistence { run, source } => f
                .debug_struct("Persistence")
                .field("execution_id", &run.execution_id)
                .field("source", source)
                .finish(),
        }
    }
}

/// Everything that can abort an integration-suite invocation.
#[derive(Error)]
pub enum IntegrationError {
    /// The source dataset is malformed.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// Every stage ran but a region file or an integration artifact could
    /// not be written. The in-memory run is returned so callers can report
    /// it or retry.
    #[error("integration results were not persisted: {source}")]
    Persistence {
        /// The completed run.
        run: Box<IntegrationRun>,
        /// The first write that failed.
        #[source]
        source: PersistenceError,
    },
}

impl fmt::Debug for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural(e) => f.debug_tuple("Structural").field(e).finish(),
            Self::Persistence { run, source } => f
                .debug_struct("Persistence")
                .field("status", &run.status)
                .field("source", source)
                .finish(),
        }
    }
}
