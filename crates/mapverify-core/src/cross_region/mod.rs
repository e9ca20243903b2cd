/// Cross-region validation.
///
/// Five independent analyses over the `crossRegion` sections of every bundle:
///
/// - [`critical`]: each expected critical connection must exist, matched on
///   its unordered endpoint pair; traffic hubs must carry enough links.
/// - [`bidirectional`]: every edge should have a reverse counterpart and no
///   edge may loop on one room.
/// - [`paths`]: hop distances between regions over the region adjacency graph.
/// - [`matrix`]: per-region-pair counts, density, consistency, redundancy.
///
/// Missing critical connections and self-loops fail the suite. Isolated
/// regions, low density and low consistency make it partial.
pub mod bidirectional;
pub mod critical;
pub mod matrix;
pub mod paths;

pub use bidirectional::BidirectionalResult;
pub use critical::{CriticalCheck, CriticalResult, HubCheck, HubStatus, MatchedConnection};
pub use matrix::ConnectionMatrix;
pub use paths::PathAnalysis;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::grade::{Status, clamp_score};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{CriticalReference, SplitData};

/// Thresholds for the soft checks.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossRegionConfig {
    /// Consistency below this makes the suite partial. Default 80.
    pub consistency_threshold: f64,
    /// Connectivity density below this makes the suite partial. Default 50.
    pub density_threshold: f64,
    /// `direction` value marking a deliberately one-way link.
    pub one_way_marker: String,
}

impl Default for CrossRegionConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: 80.0,
            density_threshold: 50.0,
            one_way_marker: "oneway".to_owned(),
        }
    }
}

/// Everything the cross-region suite reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossRegionReport {
    pub status: Status,
    pub score: f64,
    pub critical: CriticalResult,
    pub traffic_hubs: Vec<HubCheck>,
    pub bidirectional: BidirectionalResult,
    pub paths: PathAnalysis,
    pub matrix: ConnectionMatrix,
    pub issues: Vec<Issue>,
    pub execution_time_ms: u64,
}

/// Runs every cross-region analysis.
pub fn validate(
    split: &SplitData,
    reference: &CriticalReference,
    config: &CrossRegionConfig,
) -> CrossRegionReport {
    let started = Instant::now();
    let mut issues = Vec::new();

    let critical = critical::check_critical(split, reference, &mut issues);
    let traffic_hubs = critical::check_hubs(split, reference, &mut issues);
    let bidirectional = bidirectional::audit(split, &config.one_way_marker, &mut issues);
    let paths = paths::analyze(split, &mut issues);
    let matrix = matrix::build(split);

    let low_consistency = matrix.consistency_score < config.consistency_threshold;
    let low_density = matrix.connectivity_density < config.density_threshold;
    if low_consistency {
        issues.push(Issue::warning(
            IssueKind::LowConsistency,
            Subject::Dataset,
            format!(
                "consistency score {:.2} is below {:.0}",
                matrix.consistency_score, config.consistency_threshold
            ),
        ));
    }
    if low_density {
        issues.push(Issue::warning(
            IssueKind::LowDensity,
            Subject::Dataset,
            format!(
                "connectivity density {:.2}% is below {:.0}%",
                matrix.connectivity_density, config.density_threshold
            ),
        ));
    }

    let status = if critical.status == Status::Fail || bidirectional.errors > 0 {
        Status::Fail
    } else if !paths.isolated_regions.is_empty() || low_consistency || low_density {
        Status::Partial
    } else {
        Status::Pass
    };
    let score = score_of(critical.validation_rate, bidirectional.errors > 0);

    tracing::debug!(
        found = critical.found,
        expected = critical.total,
        bidi_errors = bidirectional.errors,
        isolated_regions = paths.isolated_regions.len(),
        "cross-region validated"
    );

    CrossRegionReport {
        status,
        score,
        critical,
        traffic_hubs,
        bidirectional,
        paths,
        matrix,
        issues,
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

/// Validation rate, −10 when bidirectional errors exist.
pub fn score_of(validation_rate: f64, has_bidirectional_errors: bool) -> f64 {
    let penalty = if has_bidirectional_errors { 10.0 } else { 0.0 };
    clamp_score(validation_rate - penalty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bundle, critical, healthy_world, room, split_of};

    #[test]
    fn healthy_world_passes() {
        let data = healthy_world();
        let report = validate(&data.split, &data.critical, &CrossRegionConfig::default());
        assert_eq!(report.status, Status::Pass, "issues: {:?}", report.issues);
        assert!((report.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.critical.found, 1);
    }

    #[test]
    fn missing_critical_connection_fails() {
        let mut data = healthy_world();
        data.critical
            .critical_connections
            .push(critical("w1", "west", "e2", "east"));
        let report = validate(&data.split, &data.critical, &CrossRegionConfig::default());
        assert_eq!(report.status, Status::Fail);
        assert!((report.score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn isolated_region_is_partial() {
        let split = split_of(vec![
            ("a", bundle("a", vec![room("a1", &[("e", "b1")])])),
            ("b", bundle("b", vec![room("b1", &[("w", "a1")])])),
            ("c", bundle("c", vec![room("c1", &[])])),
        ]);
        let report = validate(&split, &CriticalReference::default(), &CrossRegionConfig::default());
        assert_eq!(report.status, Status::Partial);
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::IsolatedRegion));
        assert!(report.issues.iter().any(|i| i.kind == IssueKind::LowDensity));
    }

    #[test]
    fn score_penalises_bidirectional_errors() {
        assert!((score_of(100.0, true) - 90.0).abs() < f64::EPSILON);
        assert!((score_of(5.0, true) - 0.0).abs() < f64::EPSILON);
    }
}
