/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `mapverify` binary. Every
/// variant maps to a stable exit code via [`CliError::exit_code`]:
///
/// - Exit code **2**: the tool could not read or parse its inputs. No
///   verification ran.
/// - Exit code **1**: verification ran and something went wrong: a suite or
///   stage failed, the world is unhealthy, or the results were not saved.
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `mapverify` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; `None` for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError { detail: String },

    /// Any other I/O error.
    IoError { source: String, detail: String },

    /// The input is not the expected JSON document.
    ParseFailed { source: String, detail: String },

    /// The datasets lack a required section.
    Structural { detail: String },

    // --- Exit code 1: verification failures ---
    /// Results or history could not be written.
    Persistence { detail: String },

    /// The quick health check reported an unhealthy world.
    Unhealthy,

    /// A suite or stage reported FAIL, or a suite could not run.
    VerificationFailed,

    /// The partitioner could not split the source.
    PartitionFailed { detail: String },

    /// Fail-fast stopped the pipeline.
    Aborted { detail: String },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::ParseFailed { .. }
            | Self::Structural { .. } => 2,

            Self::Persistence { .. }
            | Self::Unhealthy
            | Self::VerificationFailed
            | Self::PartitionFailed { .. }
            | Self::Aborted { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::ParseFailed { source, detail } => {
                format!("error: cannot parse {source}: {detail}")
            }
            Self::Structural { detail } => format!("error: malformed input: {detail}"),
            Self::Persistence { detail } => format!("error: results not saved: {detail}"),
            Self::Unhealthy => "error: health check failed".to_owned(),
            Self::VerificationFailed => "error: verification failed".to_owned(),
            Self::PartitionFailed { detail } => format!("error: {detail}"),
            Self::Aborted { detail } => format!("error: {detail}"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

impl From<mapverify_core::StructuralError> for CliError {
    fn from(e: mapverify_core::StructuralError) -> Self {
        Self::Structural {
            detail: e.to_string(),
        }
    }
}

impl From<mapverify_core::PersistenceError> for CliError {
    fn from(e: mapverify_core::PersistenceError) -> Self {
        Self::Persistence {
            detail: e.to_string(),
        }
    }
}

impl From<mapverify_core::PartitionError> for CliError {
    fn from(e: mapverify_core::PartitionError) -> Self {
        Self::PartitionFailed {
            detail: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn input_failures_are_exit_2() {
        let errors = [
            CliError::FileNotFound {
                path: PathBuf::from("world.json"),
            },
            CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: 10,
                actual: None,
            },
            CliError::ParseFailed {
                source: "world.json".to_owned(),
                detail: "line 1, column 1: expected value".to_owned(),
            },
            CliError::Structural {
                detail: "source dataset has no districts list".to_owned(),
            },
        ];
        for e in errors {
            assert_eq!(e.exit_code(), 2, "{e}");
        }
    }

    #[test]
    fn verification_failures_are_exit_1() {
        assert_eq!(CliError::Unhealthy.exit_code(), 1);
        assert_eq!(CliError::VerificationFailed.exit_code(), 1);
        let e = CliError::Aborted {
            detail: "pipeline aborted".to_owned(),
        };
        assert_eq!(e.exit_code(), 1);
        let e = CliError::Persistence {
            detail: "disk full".to_owned(),
        };
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn file_too_large_with_actual_mentions_sizes() {
        let e = CliError::FileTooLarge {
            source: "big.json".to_owned(),
            limit: 1_000_000,
            actual: Some(2_000_000),
        };
        let msg = e.message();
        assert!(msg.contains("2000000"), "message: {msg}");
        assert!(msg.contains("1000000"), "message: {msg}");
    }

    #[test]
    fn core_errors_convert_with_their_message() {
        let e: CliError = mapverify_core::StructuralError::EmptySplit.into();
        assert_eq!(e.exit_code(), 2);
        assert!(e.message().starts_with("error: malformed input:"));

        let e: CliError = mapverify_core::PartitionError::new("no mapping").into();
        assert_eq!(e.exit_code(), 1);
        assert!(e.message().contains("no mapping"));
    }

    #[test]
    fn display_matches_message() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("x.json"),
        };
        assert_eq!(format!("{e}"), e.message());
    }
}
