/// Data integrity between the source dataset and the region bundles.
///
/// The suite runs every check, collects their issues, and folds four rates
/// into one quality score:
///
/// | rate | from |
/// |---|---|
/// | completeness | [`ids::check_completeness`] |
/// | accuracy | [`semantic::check_semantics`] |
/// | consistency | [`semantic::check_semantics`] |
/// | validity | [`format::check_format`] |
///
/// Duplicate ids and any missing or extra room fail the suite outright; a
/// quality score under the threshold makes it partial.
pub mod format;
pub mod ids;
pub mod logic;
pub mod semantic;
pub mod structure;
pub mod temporal;

pub use structure::{missing_section, validate_source, validate_test_data};

use std::time::Instant;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::grade::{Status, clamp_score};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{SourceDataset, SplitData};

use format::FormatCheck;
use ids::{CompletenessCheck, UniquenessCheck};
use logic::{LogicCheck, ReliabilityMetrics};
use semantic::SemanticCheck;
use structure::StructureCheck;
use temporal::TemporalCheck;

/// Thresholds and tolerances for [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityConfig {
    /// Quality and consistency below this cost score and status. Default 80.
    pub quality_threshold: f64,
    /// Per-axis coordinate tolerance. Default 0.01.
    pub coordinate_tolerance: f64,
    /// Longest acceptable room name in characters. Default 100.
    pub max_name_len: usize,
    /// Largest allowed spread of bundle migration dates. Default one hour.
    pub max_date_skew: Duration,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 80.0,
            coordinate_tolerance: 0.01,
            max_name_len: 100,
            max_date_skew: Duration::hours(1),
        }
    }
}

/// The four equally weighted rates and their mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub completeness_rate: f64,
    pub accuracy_rate: f64,
    pub consistency_rate: f64,
    pub validity_rate: f64,
    pub overall: f64,
}

/// Everything the data integrity suite reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub status: Status,
    pub score: f64,
    pub uniqueness: UniquenessCheck,
    pub completeness: CompletenessCheck,
    pub semantics: SemanticCheck,
    pub format: FormatCheck,
    pub structure: StructureCheck,
    pub logic: LogicCheck,
    pub temporal: TemporalCheck,
    pub reliability: ReliabilityMetrics,
    pub quality_issues: usize,
    pub quality: QualityScore,
    pub issues: Vec<Issue>,
    pub execution_time_ms: u64,
}

/// Runs every integrity check.
pub fn validate(
    source: &SourceDataset,
    split: &SplitData,
    config: &IntegrityConfig,
) -> IntegrityReport {
    let started = Instant::now();
    let mut issues = Vec::new();

    let structure = structure::check_bundles(split, &mut issues);
    let uniqueness = ids::check_uniqueness(split, &mut issues);
    let completeness = ids::check_completeness(source, split, &mut issues);
    let semantics =
        semantic::check_semantics(source, split, config.coordinate_tolerance, &mut issues);
    let format = format::check_format(split, &mut issues);
    let logic = logic::check_logic(split, &mut issues);
    let temporal = temporal::check_temporal(split, config.max_date_skew, &mut issues);
    let quality_issues = format::check_quality(split, config.max_name_len, &mut issues);
    let reliability = logic::reliability(split);

    let completeness_rate = completeness.completeness_rate;
    let accuracy_rate = semantics.accuracy_rate;
    let consistency_rate = semantics.consistency_rate;
    let validity_rate = format.validity_rate;
    let quality = QualityScore {
        completeness_rate,
        accuracy_rate,
        consistency_rate,
        validity_rate,
        overall: (completeness_rate + accuracy_rate + consistency_rate + validity_rate) / 4.0,
    };

    let low_quality = quality.overall < config.quality_threshold;
    if low_quality {
        issues.push(Issue::warning(
            IssueKind::LowQuality,
            Subject::Dataset,
            format!(
                "quality score {:.1} is below {:.0}",
                quality.overall, config.quality_threshold
            ),
        ));
    }

    let fatal = !uniqueness.duplicates.is_empty() || !completeness.is_complete();
    let status = if fatal {
        Status::Fail
    } else if low_quality {
        Status::Partial
    } else {
        Status::Pass
    };
    let score = score_of(
        status,
        quality.overall < config.quality_threshold,
        consistency_rate < config.quality_threshold,
    );

    tracing::debug!(
        duplicates = uniqueness.duplicates.len(),
        missing = completeness.missing.len(),
        extra = completeness.extra.len(),
        quality = quality.overall,
        "data integrity validated"
    );

    IntegrityReport {
        status,
        score,
        uniqueness,
        completeness,
        semantics,
        format,
        structure,
        logic,
        temporal,
        reliability,
        quality_issues,
        quality,
        issues,
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

/// 100, −40 on FAIL, −20 for low quality, −20 for low consistency.
pub fn score_of(status: Status, low_quality: bool, low_consistency: bool) -> f64 {
    let mut score = 100.0;
    if status == Status::Fail {
        score -= 40.0;
    }
    if low_quality {
        score -= 20.0;
    }
    if low_consistency {
        score -= 20.0;
    }
    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bundle, healthy_world, room, source_for, split_of};

    #[test]
    fn identical_datasets_pass() {
        let data = healthy_world();
        let report = validate(&data.source, &data.split, &IntegrityConfig::default());
        assert_eq!(report.status, Status::Pass, "issues: {:?}", report.issues);
        assert!((report.score - 100.0).abs() < f64::EPSILON);
        assert!((report.quality.overall - 100.0).abs() < f64::EPSILON);
        assert!(report.completeness.is_complete());
    }

    #[test]
    fn dropped_room_fails_the_suite() {
        let data = healthy_world();
        let split = split_of(vec![
            ("west", bundle("west", vec![room("w1", &[])])),
            ("east", bundle("east", vec![room("e1", &[]), room("e2", &[])])),
        ]);
        let report = validate(&data.source, &split, &IntegrityConfig::default());
        assert_eq!(report.status, Status::Fail);
        assert_eq!(report.completeness.missing, ["w2"]);
        assert!(report.score <= 60.0);
    }

    #[test]
    fn duplicate_room_fails_even_when_complete() {
        let split = split_of(vec![
            ("a", bundle("a", vec![room("x", &[]), room("y", &[])])),
            ("b", bundle("b", vec![room("y", &[])])),
        ]);
        let source = source_for(&split_of(vec![(
            "a",
            bundle("a", vec![room("x", &[]), room("y", &[])]),
        )]));
        let report = validate(&source, &split, &IntegrityConfig::default());
        assert!(report.completeness.is_complete());
        assert_eq!(report.uniqueness.duplicates, ["y"]);
        assert_eq!(report.status, Status::Fail);
    }

    #[test]
    fn renamed_rooms_lower_quality_to_partial() {
        let source_split = split_of(vec![(
            "a",
            bundle("a", (0..4).map(|i| room(&format!("r{i}"), &[])).collect()),
        )]);
        let source = source_for(&source_split);
        let renamed: Vec<_> = (0..4)
            .map(|i| {
                let mut r = room(&format!("r{i}"), &[]);
                r.name = format!("Other {i}");
                r
            })
            .collect();
        let split = split_of(vec![("a", bundle("a", renamed))]);
        let report = validate(&source, &split, &IntegrityConfig::default());
        // completeness 100, accuracy 0, consistency 0, validity 100 => 50
        assert!((report.quality.overall - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.status, Status::Partial);
        assert!((report.score - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_penalties_accumulate() {
        assert!((score_of(Status::Fail, true, true) - 20.0).abs() < f64::EPSILON);
        assert!((score_of(Status::Pass, false, false) - 100.0).abs() < f64::EPSILON);
    }
}
