//! Per-operation grade thresholds.
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Graph build plus connectivity validation.
pub const CONNECTIVITY_VALIDATION: &str = "connectivityValidation";
/// The cross-region suite.
pub const CROSS_REGION_VALIDATION: &str = "crossRegionValidation";
/// The data integrity suite.
pub const DATA_INTEGRITY_CHECK: &str = "dataIntegrityCheck";
/// Invoking the partitioner on the source dataset.
pub const MAP_SPLITTING: &str = "mapSplitting";
/// Id, name and region lookups on a built graph.
pub const QUERY_PERFORMANCE: &str = "queryPerformance";

/// Mean-time limits in milliseconds for grades A through D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Thresholds {
    /// Thresholds for `operation`; unknown operations use the defaults.
    pub fn for_operation(operation: &str) -> Thresholds {
        match operation {
            MAP_SPLITTING => Thresholds {
                excellent: 100.0,
                good: 500.0,
                average: 1000.0,
                poor: 2000.0,
            },
            DATA_INTEGRITY_CHECK => Thresholds {
                excellent: 100.0,
                good: 200.0,
                average: 400.0,
                poor: 800.0,
            },
            _ => Thresholds {
                excellent: 50.0,
                good: 100.0,
                average: 200.0,
                poor: 500.0,
            },
        }
    }

    /// Grades a mean time: at or under `excellent` is A, down to F above
    /// `poor`.
    pub fn grade(&self, mean_ms: f64) -> Grade {
        if mean_ms <= self.excellent {
            Grade::A
        } else if mean_ms <= self.good {
            Grade::B
        } else if mean_ms <= self.average {
            Grade::C
        } else if mean_ms <= self.poor {
            Grade::D
        } else {
            Grade::F
        }
    }
}

/// Grades lookups by throughput (queries per second) and mean latency (ms).
pub fn query_grade(throughput_qps: f64, latency_ms: f64) -> Grade {
    if throughput_qps >= 1000.0 && latency_ms <= 1.0 {
        Grade::A
    } else if throughput_qps >= 500.0 && latency_ms <= 5.0 {
        Grade::B
    } else if throughput_qps >= 100.0 && latency_ms <= 10.0 {
        Grade::C
    } else if throughput_qps >= 50.0 && latency_ms <= 50.0 {
        Grade::D
    } else {
        Grade::F
    }
}

/// Fixed remediation hints for an operation that graded poorly.
pub fn suggestions(operation: &str) -> &'static [&'static str] {
    match operation {
        MAP_SPLITTING => &[
            "use more efficient data structures for room assignment",
            "optimise the room allocation pass",
            "avoid unnecessary copies of room records",
        ],
        CONNECTIVITY_VALIDATION => &[
            "optimise graph traversal",
            "cache the built room graph between validators",
            "split very large graphs before traversal",
        ],
        DATA_INTEGRITY_CHECK => &[
            "index rooms by id before comparing",
            "validate incrementally instead of from scratch",
            "reduce intermediate allocations",
        ],
        QUERY_PERFORMANCE => &[
            "add id and name indexes",
            "optimise lookup paths",
            "cache frequent query results",
        ],
        _ => &["profile the operation to find the bottleneck", "optimise the algorithm"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_thresholds_grade_boundaries() {
        let t = Thresholds::for_operation(CONNECTIVITY_VALIDATION);
        assert_eq!(t.grade(50.0), Grade::A);
        assert_eq!(t.grade(50.1), Grade::B);
        assert_eq!(t.grade(200.0), Grade::C);
        assert_eq!(t.grade(500.0), Grade::D);
        assert_eq!(t.grade(500.1), Grade::F);
    }

    #[test]
    fn splitting_is_graded_more_leniently() {
        let t = Thresholds::for_operation(MAP_SPLITTING);
        assert_eq!(t.grade(450.0), Grade::B);
        assert_eq!(
            Thresholds::for_operation("somethingElse"),
            Thresholds::for_operation(CROSS_REGION_VALIDATION)
        );
    }

    #[test]
    fn query_grade_needs_both_throughput_and_latency() {
        assert_eq!(query_grade(2000.0, 0.5), Grade::A);
        assert_eq!(query_grade(2000.0, 4.0), Grade::B);
        assert_eq!(query_grade(80.0, 0.1), Grade::D);
        assert_eq!(query_grade(10.0, 0.1), Grade::F);
    }

    #[test]
    fn unknown_operation_gets_generic_suggestions() {
        assert_eq!(suggestions("other").len(), 2);
        assert_eq!(suggestions(MAP_SPLITTING).len(), 3);
    }
}
