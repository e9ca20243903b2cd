//! Identifier uniqueness and source/split completeness.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::grade::percent;
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{SourceDataset, SplitData, split_rooms};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessCheck {
    /// Room records across all bundles, duplicates included.
    pub total_rooms: usize,
    pub unique_rooms: usize,
    /// Ids seen more than once, sorted.
    pub duplicates: Vec<String>,
}

/// Finds room ids that appear more than once across all bundles.
pub fn check_uniqueness(split: &SplitData, issues: &mut Vec<Issue>) -> UniquenessCheck {
    let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut total_rooms = 0usize;
    for (region, _, room) in split_rooms(split) {
        total_rooms += 1;
        seen.entry(room.id.as_str()).or_default().push(region);
    }

    let mut duplicates = Vec::new();
    for (id, regions) in &seen {
        if regions.len() > 1 {
            duplicates.push((*id).to_owned());
            issues.push(Issue::error(
                IssueKind::DuplicateRoom,
                Subject::room(*id),
                format!(
                    "room id appears {} times (regions: {})",
                    regions.len(),
                    regions.join(", ")
                ),
            ));
        }
    }

    UniquenessCheck {
        total_rooms,
        unique_rooms: seen.len(),
        duplicates,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessCheck {
    /// Distinct room ids in the source.
    pub source_rooms: usize,
    /// Distinct room ids across the bundles.
    pub split_rooms: usize,
    /// In source only, sorted.
    pub missing: Vec<String>,
    /// In split only, sorted.
    pub extra: Vec<String>,
    /// Share of source ids present in the split.
    pub completeness_rate: f64,
}

impl CompletenessCheck {
    /// True when both sides hold exactly the same ids.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Computes the symmetric difference between source and split room ids.
pub fn check_completeness(
    source: &SourceDataset,
    split: &SplitData,
    issues: &mut Vec<Issue>,
) -> CompletenessCheck {
    let source_ids: BTreeSet<&str> = source.rooms().map(|(_, _, r)| r.id.as_str()).collect();
    let split_ids: BTreeSet<&str> = split_rooms(split).map(|(_, _, r)| r.id.as_str()).collect();

    let missing: Vec<String> = source_ids
        .difference(&split_ids)
        .map(|s| (*s).to_owned())
        .collect();
    let extra: Vec<String> = split_ids
        .difference(&source_ids)
        .map(|s| (*s).to_owned())
        .collect();

    for id in &missing {
        issues.push(Issue::error(
            IssueKind::MissingRoom,
            Subject::room(id),
            "present in the source but in no bundle",
        ));
    }
    for id in &extra {
        issues.push(Issue::error(
            IssueKind::ExtraRoom,
            Subject::room(id),
            "present in a bundle but not in the source",
        ));
    }

    CompletenessCheck {
        source_rooms: source_ids.len(),
        split_rooms: split_ids.len(),
        completeness_rate: percent(source_ids.len() - missing.len(), source_ids.len()),
        missing,
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bundle, healthy_world, room, source_for, split_of};

    #[test]
    fn identical_sides_are_complete() {
        let data = healthy_world();
        let mut issues = Vec::new();
        let check = check_completeness(&data.source, &data.split, &mut issues);
        assert!(check.is_complete());
        assert!((check.completeness_rate - 100.0).abs() < f64::EPSILON);
        assert!(issues.is_empty());
    }

    #[test]
    fn symmetric_difference_is_reported_both_ways() {
        let source = source_for(&split_of(vec![(
            "r",
            bundle("r", vec![room("a", &[]), room("b", &[])]),
        )]));
        let split = split_of(vec![("r", bundle("r", vec![room("b", &[]), room("c", &[])]))]);
        let mut issues = Vec::new();
        let check = check_completeness(&source, &split, &mut issues);
        assert_eq!(check.missing, ["a"]);
        assert_eq!(check.extra, ["c"]);
        assert!((check.completeness_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn duplicates_across_bundles_are_found() {
        let split = split_of(vec![
            ("a", bundle("a", vec![room("x", &[]), room("dup", &[])])),
            ("b", bundle("b", vec![room("dup", &[])])),
        ]);
        let mut issues = Vec::new();
        let check = check_uniqueness(&split, &mut issues);
        assert_eq!(check.total_rooms, 3);
        assert_eq!(check.unique_rooms, 2);
        assert_eq!(check.duplicates, ["dup"]);
        assert!(issues[0].message.contains("a, b"));
    }
}
