//! Structural preconditions and bundle-level business rules.
use serde::{Deserialize, Serialize};

use crate::error::StructuralError;
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{RegionBundle, SourceDataset, SplitData, TestData};

/// Rejects input that cannot be verified at all.
///
/// Checks, in order: the source has a district list, every district has a
/// location list, every location has a room list, the split is non-empty,
/// and every bundle carries its `region`, `locations` and `connections`
/// sections.
///
/// # Errors
///
/// Returns the first [`StructuralError`] found.
pub fn validate_test_data(data: &TestData) -> Result<(), StructuralError> {
    validate_source(&data.source)?;

    if data.split.is_empty() {
        return Err(StructuralError::EmptySplit);
    }
    for (region, bundle) in &data.split {
        if let Some(section) = missing_section(bundle) {
            return Err(StructuralError::IncompleteBundle {
                region: region.clone(),
                section,
            });
        }
    }
    Ok(())
}

/// The source-dataset half of [`validate_test_data`].
///
/// # Errors
///
/// Returns the first [`StructuralError`] found.
pub fn validate_source(source: &SourceDataset) -> Result<(), StructuralError> {
    let districts = source
        .districts
        .as_ref()
        .ok_or(StructuralError::MissingDistricts)?;
    for district in districts {
        let locations =
            district
                .locations
                .as_ref()
                .ok_or_else(|| StructuralError::MissingLocations {
                    district: district.id.clone(),
                })?;
        for location in locations {
            if location.rooms.is_none() {
                return Err(StructuralError::MissingRooms {
                    location: location.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// The first required section `bundle` lacks, if any.
pub fn missing_section(bundle: &RegionBundle) -> Option<&'static str> {
    if bundle.region.is_none() {
        Some("region")
    } else if bundle.locations.is_none() {
        Some("locations")
    } else if bundle.connections.is_none() {
        Some("connections")
    } else {
        None
    }
}

/// Outcome of the bundle-level rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureCheck {
    pub incomplete_bundles: usize,
    pub empty_regions: usize,
    pub room_count_mismatches: usize,
}

/// Reports missing sections, empty regions and declared room counts that
/// disagree with the rooms actually present.
pub fn check_bundles(split: &SplitData, issues: &mut Vec<Issue>) -> StructureCheck {
    let mut check = StructureCheck::default();
    for (region, bundle) in split {
        if let Some(section) = missing_section(bundle) {
            check.incomplete_bundles += 1;
            issues.push(Issue::error(
                IssueKind::IncompleteStructure,
                Subject::region(region),
                format!("bundle is missing its {section} section"),
            ));
        }

        let actual = bundle.room_count();
        if actual == 0 {
            check.empty_regions += 1;
            issues.push(Issue::error(
                IssueKind::EmptyRegion,
                Subject::region(region),
                "region holds no rooms",
            ));
        }
        let declared = bundle.region.as_ref().and_then(|r| r.room_count);
        if let Some(declared) = declared.filter(|&d| d != actual) {
            check.room_count_mismatches += 1;
            issues.push(Issue::warning(
                IssueKind::RoomCountMismatch,
                Subject::region(region),
                format!("roomCount is {declared} but the bundle holds {actual} room(s)"),
            ));
        }
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceDataset;
    use crate::test_helpers::{bundle, healthy_world, room, split_of};

    #[test]
    fn healthy_world_is_structurally_valid() {
        assert_eq!(validate_test_data(&healthy_world()), Ok(()));
    }

    #[test]
    fn missing_districts_is_rejected_first() {
        let mut data = healthy_world();
        data.source = SourceDataset::default();
        assert_eq!(
            validate_test_data(&data),
            Err(StructuralError::MissingDistricts)
        );
    }

    #[test]
    fn empty_split_is_rejected() {
        let mut data = healthy_world();
        data.split.clear();
        assert_eq!(validate_test_data(&data), Err(StructuralError::EmptySplit));
    }

    #[test]
    fn bundle_without_connections_is_rejected() {
        let mut data = healthy_world();
        if let Some(b) = data.split.get_mut("east") {
            b.connections = None;
        }
        assert_eq!(
            validate_test_data(&data),
            Err(StructuralError::IncompleteBundle {
                region: "east".to_owned(),
                section: "connections",
            })
        );
    }

    #[test]
    fn empty_region_and_count_mismatch_are_reported() {
        let mut split = split_of(vec![
            ("a", bundle("a", vec![room("a1", &[])])),
            ("b", bundle("b", vec![])),
        ]);
        if let Some(info) = split.get_mut("a").and_then(|b| b.region.as_mut()) {
            info.room_count = Some(3);
        }
        let mut issues = Vec::new();
        let check = check_bundles(&split, &mut issues);
        assert_eq!(check.empty_regions, 1);
        assert_eq!(check.room_count_mismatches, 1);
        assert_eq!(issues.len(), 2);
    }
}
