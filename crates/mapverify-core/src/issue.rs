/// Issue types shared by every suite.
///
/// An [`Issue`] is a validation failure: an invariant that did not hold. Issues
/// are data, never Rust errors; every suite collects all of its issues before
/// returning and reflects them in its status and score.
///
/// Each issue carries an [`IssueKind`] (with a stable code such as `"XR-01"`),
/// a [`Severity`], the [`Subject`] it is about and a human-readable message.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An invariant was violated.
    Error,
    /// Suspicious but not necessarily wrong.
    Warning,
    /// Observation only.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
            Self::Info => f.write_str("info"),
        }
    }
}

/// Machine-readable identifier for the check that produced an issue.
///
/// Codes are grouped by suite: `CN-*` connectivity, `XR-*` cross-region,
/// `DI-*` data integrity, `PF-*` performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// CN-01: an exit points at a room that does not exist.
    DanglingExit,
    /// CN-02: a room has no edges at all.
    IsolatedRoom,
    /// CN-03: the graph splits into more than one component.
    DisconnectedComponent,

    /// XR-01: a critical connection is absent from every bundle.
    MissingCriticalConnection,
    /// XR-02: a critical connection was found between unexpected regions.
    RegionMismatch,
    /// XR-03: a cross-region edge has no reverse counterpart.
    MissingReverseConnection,
    /// XR-04: a cross-region edge starts and ends in the same room.
    SelfLoop,
    /// XR-05: a region has no cross-region adjacency.
    IsolatedRegion,
    /// XR-06: per-region connection counts vary too much.
    LowConsistency,
    /// XR-07: too few region pairs are directly connected.
    LowDensity,
    /// XR-08: a traffic hub has fewer connections than expected.
    HubInsufficient,
    /// XR-09: a traffic hub has no cross-region connections.
    HubMissing,

    /// DI-01: a room id appears more than once across bundles.
    DuplicateRoom,
    /// DI-02: a source room is absent from the bundles.
    MissingRoom,
    /// DI-03: a bundle room is absent from the source.
    ExtraRoom,
    /// DI-04: name, type or coordinates differ between source and bundle.
    FieldMismatch,
    /// DI-05: a record lacks a required field.
    MissingField,
    /// DI-06: a bundle lacks a required section.
    IncompleteStructure,
    /// DI-07: a region holds no rooms.
    EmptyRegion,
    /// DI-08: the declared room count disagrees with the actual one.
    RoomCountMismatch,
    /// DI-09: a connection links a room to itself.
    SelfConnection,
    /// DI-10: a connection endpoint is not where the bundle says it is.
    UnknownEndpoint,
    /// DI-11: bundle migration dates are too far apart.
    TemporalDrift,
    /// DI-12: a migration date cannot be parsed.
    InvalidDate,
    /// DI-13: an id or name violates basic quality rules.
    QualityIssue,
    /// DI-14: the composite quality score is below threshold.
    LowQuality,

    /// PF-01: a benchmark iteration failed.
    FailedIteration,
    /// PF-02: an operation graded below B.
    SlowOperation,
}

impl IssueKind {
    /// Every kind, in code order.
    pub const ALL: [IssueKind; 28] = [
        Self::DanglingExit,
        Self::IsolatedRoom,
        Self::DisconnectedComponent,
        Self::MissingCriticalConnection,
        Self::RegionMismatch,
        Self::MissingReverseConnection,
        Self::SelfLoop,
        Self::IsolatedRegion,
        Self::LowConsistency,
        Self::LowDensity,
        Self::HubInsufficient,
        Self::HubMissing,
        Self::DuplicateRoom,
        Self::MissingRoom,
        Self::ExtraRoom,
        Self::FieldMismatch,
        Self::MissingField,
        Self::IncompleteStructure,
        Self::EmptyRegion,
        Self::RoomCountMismatch,
        Self::SelfConnection,
        Self::UnknownEndpoint,
        Self::TemporalDrift,
        Self::InvalidDate,
        Self::QualityIssue,
        Self::LowQuality,
        Self::FailedIteration,
        Self::SlowOperation,
    ];

    /// Returns the stable code string, e.g. `"DI-02"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::DanglingExit => "CN-01",
            Self::IsolatedRoom => "CN-02",
            Self::DisconnectedComponent => "CN-03",
            Self::MissingCriticalConnection => "XR-01",
            Self::RegionMismatch => "XR-02",
            Self::MissingReverseConnection => "XR-03",
            Self::SelfLoop => "XR-04",
            Self::IsolatedRegion => "XR-05",
            Self::LowConsistency => "XR-06",
            Self::LowDensity => "XR-07",
            Self::HubInsufficient => "XR-08",
            Self::HubMissing => "XR-09",
            Self::DuplicateRoom => "DI-01",
            Self::MissingRoom => "DI-02",
            Self::ExtraRoom => "DI-03",
            Self::FieldMismatch => "DI-04",
            Self::MissingField => "DI-05",
            Self::IncompleteStructure => "DI-06",
            Self::EmptyRegion => "DI-07",
            Self::RoomCountMismatch => "DI-08",
            Self::SelfConnection => "DI-09",
            Self::UnknownEndpoint => "DI-10",
            Self::TemporalDrift => "DI-11",
            Self::InvalidDate => "DI-12",
            Self::QualityIssue => "DI-13",
            Self::LowQuality => "DI-14",
            Self::FailedIteration => "PF-01",
            Self::SlowOperation => "PF-02",
        }
    }

    /// Parses a code produced by [`IssueKind::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for IssueKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for IssueKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown issue code {code:?}")))
    }
}

/// What an issue is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Subject {
    /// The dataset as a whole.
    Dataset,
    /// A single room.
    Room {
        /// Room id.
        id: String,
    },
    /// A location record.
    Location {
        /// Location id.
        id: String,
    },
    /// A region bundle.
    Region {
        /// Region id.
        id: String,
    },
    /// A directed connection between two rooms.
    Connection {
        /// Source room id.
        from: String,
        /// Target room id.
        to: String,
    },
    /// An ordered pair of regions.
    RegionPair {
        /// Source region id.
        from: String,
        /// Target region id.
        to: String,
    },
    /// A benchmarked operation.
    Operation {
        /// Operation name.
        name: String,
    },
}

impl Subject {
    /// Shorthand for [`Subject::Room`].
    pub fn room(id: impl Into<String>) -> Self {
        Self::Room { id: id.into() }
    }

    /// Shorthand for [`Subject::Region`].
    pub fn region(id: impl Into<String>) -> Self {
        Self::Region { id: id.into() }
    }

    /// Shorthand for [`Subject::Connection`].
    pub fn connection(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Connection {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset => f.write_str("(dataset)"),
            Self::Room { id } => write!(f, "room \"{id}\""),
            Self::Location { id } => write!(f, "location \"{id}\""),
            Self::Region { id } => write!(f, "region \"{id}\""),
            Self::Connection { from, to } => write!(f, "connection \"{from}\" -> \"{to}\""),
            Self::RegionPair { from, to } => write!(f, "regions \"{from}\" -> \"{to}\""),
            Self::Operation { name } => write!(f, "operation \"{name}\""),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The check that produced this issue.
    pub kind: IssueKind,
    /// How serious it is.
    pub severity: Severity,
    /// What it is about.
    pub subject: Subject,
    /// Human-readable explanation.
    pub message: String,
}

impl Issue {
    /// Constructs a new [`Issue`].
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        subject: Subject,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            subject,
            message: message.into(),
        }
    }

    /// Constructs an error-severity issue.
    pub fn error(kind: IssueKind, subject: Subject, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, subject, message)
    }

    /// Constructs a warning-severity issue.
    pub fn warning(kind: IssueKind, subject: Subject, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, subject, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_char = match self.severity {
            Severity::Error => 'E',
            Severity::Warning => 'W',
            Severity::Info => 'I',
        };
        write!(
            f,
            "[{level_char}] {} {}: {}",
            self.kind, self.subject, self.message
        )
    }
}

/// Number of issues with the given severity.
pub fn count_severity(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}
