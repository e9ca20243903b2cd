//! Score comparison against the most recent earlier run.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SuiteName;
use crate::grade::Priority;
use crate::history::HistoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionStatus {
    /// No earlier run to compare with.
    NoBaseline,
    Stable,
    RegressionDetected,
}

impl RegressionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoBaseline => "no_baseline",
            Self::Stable => "stable",
            Self::RegressionDetected => "regression_detected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComparison {
    pub historical: f64,
    pub current: f64,
    /// `current − historical`.
    pub difference: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    pub suite: SuiteName,
    pub score_drop: f64,
    /// High when the drop exceeds the high-severity threshold.
    pub severity: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub suite: SuiteName,
    pub score_improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionAnalysis {
    pub status: RegressionStatus,
    /// Execution id of the run compared against.
    pub baseline: Option<String>,
    pub score_comparison: BTreeMap<SuiteName, ScoreComparison>,
    pub regressions: Vec<Regression>,
    pub improvements: Vec<Improvement>,
}

impl RegressionAnalysis {
    fn no_baseline() -> Self {
        Self {
            status: RegressionStatus::NoBaseline,
            baseline: None,
            score_comparison: BTreeMap::new(),
            regressions: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

/// Compares `current` suite scores with `latest`.
///
/// Only suites present in both are compared. A drop of more than `threshold`
/// points is a regression, high severity when it exceeds `high_threshold`; a
/// rise of more than `threshold` is an improvement.
pub fn analyze(
    current: &BTreeMap<SuiteName, f64>,
    latest: Option<&HistoryRecord>,
    threshold: f64,
    high_threshold: f64,
) -> RegressionAnalysis {
    let Some(latest) = latest else {
        return RegressionAnalysis::no_baseline();
    };

    let mut analysis = RegressionAnalysis {
        status: RegressionStatus::Stable,
        baseline: Some(latest.execution_id.clone()),
        ..RegressionAnalysis::no_baseline()
    };
    for (&suite, &score) in current {
        let Some(&historical) = latest.suite_scores.get(&suite) else {
            continue;
        };
        let difference = score - historical;
        analysis.score_comparison.insert(
            suite,
            ScoreComparison {
                historical,
                current: score,
                difference,
            },
        );
        if difference < -threshold {
            let score_drop = -difference;
            analysis.regressions.push(Regression {
                suite,
                score_drop,
                severity: if score_drop > high_threshold {
                    Priority::High
                } else {
                    Priority::Medium
                },
            });
        } else if difference > threshold {
            analysis.improvements.push(Improvement {
                suite,
                score_improvement: difference,
            });
        }
    }
    if !analysis.regressions.is_empty() {
        analysis.status = RegressionStatus::RegressionDetected;
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record;

    fn scores(pairs: &[(SuiteName, f64)]) -> BTreeMap<SuiteName, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn fifteen_point_drop_is_a_medium_regression() {
        let previous = record("run-1", &[(SuiteName::Connectivity, 85.0)]);
        let a = analyze(
            &scores(&[(SuiteName::Connectivity, 70.0)]),
            Some(&previous),
            10.0,
            20.0,
        );
        assert_eq!(a.status, RegressionStatus::RegressionDetected);
        assert_eq!(a.regressions.len(), 1);
        assert_eq!(a.regressions[0].severity, Priority::Medium);
        assert!((a.regressions[0].score_drop - 15.0).abs() < 1e-9);
        assert!((a.score_comparison[&SuiteName::Connectivity].difference + 15.0).abs() < 1e-9);
    }

    #[test]
    fn large_drop_is_high_and_rise_is_improvement() {
        let previous = record(
            "run-1",
            &[(SuiteName::CrossRegion, 90.0), (SuiteName::DataIntegrity, 40.0)],
        );
        let a = analyze(
            &scores(&[(SuiteName::CrossRegion, 60.0), (SuiteName::DataIntegrity, 100.0)]),
            Some(&previous),
            10.0,
            20.0,
        );
        assert_eq!(a.regressions[0].severity, Priority::High);
        assert_eq!(a.improvements[0].suite, SuiteName::DataIntegrity);
        assert_eq!(a.baseline.as_deref(), Some("run-1"));
    }

    #[test]
    fn small_changes_and_new_suites_are_stable() {
        let previous = record("run-1", &[(SuiteName::Connectivity, 80.0)]);
        let a = analyze(
            &scores(&[(SuiteName::Connectivity, 71.0), (SuiteName::Performance, 10.0)]),
            Some(&previous),
            10.0,
            20.0,
        );
        assert_eq!(a.status, RegressionStatus::Stable);
        assert_eq!(a.score_comparison.len(), 1);
    }

    #[test]
    fn without_history_there_is_no_baseline() {
        let a = analyze(&scores(&[(SuiteName::Connectivity, 70.0)]), None, 10.0, 20.0);
        assert_eq!(a.status, RegressionStatus::NoBaseline);
        assert!(a.score_comparison.is_empty());
    }
}
