//! Suite status, letter grades and the score arithmetic shared by every suite.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single suite or stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Every invariant held.
    Pass,
    /// Only soft thresholds were missed.
    Partial,
    /// At least one hard invariant was violated.
    Fail,
}

impl Status {
    /// Combines two statuses, keeping the worse one.
    pub fn worst(self, other: Status) -> Status {
        match (self, other) {
            (Status::Fail, _) | (_, Status::Fail) => Status::Fail,
            (Status::Partial, _) | (_, Status::Partial) => Status::Partial,
            (Status::Pass, Status::Pass) => Status::Pass,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Partial => f.write_str("PARTIAL"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Letter grade A–F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Maps a 0–100 score to a grade: ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F.
    pub fn from_score(score: f64) -> Grade {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Representative score of a grade: A 95, B 85, C 75, D 65, F 30.
    pub fn score(self) -> f64 {
        match self {
            Grade::A => 95.0,
            Grade::B => 85.0,
            Grade::C => 75.0,
            Grade::D => 65.0,
            Grade::F => 30.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Urgency attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// High under 60, medium under 80, low otherwise.
    pub fn from_score(score: f64) -> Priority {
        if score < 60.0 {
            Priority::High
        } else if score < 80.0 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
        }
    }
}

/// Clamps a score into `0..=100`. NaN maps to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// `part / whole` as a percentage; an empty whole counts as 100 %.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        100.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_score(90.0), Grade::A);
        assert_eq!(Grade::from_score(89.99), Grade::B);
        assert_eq!(Grade::from_score(80.0), Grade::B);
        assert_eq!(Grade::from_score(70.0), Grade::C);
        assert_eq!(Grade::from_score(60.0), Grade::D);
        assert_eq!(Grade::from_score(59.9), Grade::F);
    }

    #[test]
    fn grade_scores_grade_back_to_themselves() {
        for grade in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F] {
            assert_eq!(Grade::from_score(grade.score()), grade);
        }
    }

    #[test]
    fn worst_status_wins() {
        assert_eq!(Status::Pass.worst(Status::Partial), Status::Partial);
        assert_eq!(Status::Partial.worst(Status::Fail), Status::Fail);
        assert_eq!(Status::Pass.worst(Status::Pass), Status::Pass);
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Status::Partial).ok().as_deref(),
            Some("\"PARTIAL\"")
        );
    }

    #[test]
    fn priority_follows_score_bands() {
        assert_eq!(Priority::from_score(59.9), Priority::High);
        assert_eq!(Priority::from_score(60.0), Priority::Medium);
        assert_eq!(Priority::from_score(80.0), Priority::Low);
    }

    #[test]
    fn percent_of_empty_whole_is_full() {
        assert!((percent(0, 0) - 100.0).abs() < f64::EPSILON);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn clamp_score_stays_in_range(x in proptest::num::f64::ANY) {
            let c = clamp_score(x);
            prop_assert!((0.0..=100.0).contains(&c));
        }
    }
}
