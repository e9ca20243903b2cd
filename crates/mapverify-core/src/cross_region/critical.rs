//! Critical-connection matching and traffic-hub counting.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grade::{Status, percent};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{CriticalConnectionSpec, CriticalReference, SplitData, split_cross_region, split_rooms};

/// The stored cross-region connection that satisfied a critical spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedConnection {
    pub from: String,
    pub to: String,
    /// Bundle that declares the connection.
    pub source_region: String,
    pub target_region: String,
    pub direction: String,
    pub connection_id: String,
}

/// Outcome for one [`CriticalConnectionSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalCheck {
    pub expected: CriticalConnectionSpec,
    pub found: bool,
    pub actual: Option<MatchedConnection>,
    pub region_match: bool,
    /// Plain comparison of the stored direction with the expected one.
    pub direction_match: bool,
}

/// Aggregate of every [`CriticalCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalResult {
    pub total: usize,
    pub found: usize,
    pub fully_valid: usize,
    pub missing: usize,
    /// found / total as a percentage; 100 when nothing is expected.
    pub validation_rate: f64,
    pub full_validation_rate: f64,
    pub checks: Vec<CriticalCheck>,
    pub status: Status,
}

/// Searches every bundle for each critical spec, ignoring which endpoint a
/// stored connection starts from.
pub fn check_critical(
    split: &SplitData,
    reference: &CriticalReference,
    issues: &mut Vec<Issue>,
) -> CriticalResult {
    let mut checks = Vec::with_capacity(reference.critical_connections.len());

    for spec in &reference.critical_connections {
        let hit = split_cross_region(split).find(|(_, c)| {
            (c.from == spec.source_room_id && c.to == spec.target_room_id)
                || (c.from == spec.target_room_id && c.to == spec.source_room_id)
        });

        let check = match hit {
            Some((region, c)) => {
                // A connection stored from the target side swaps the roles.
                let (from_district, to_district) = if c.from == spec.source_room_id {
                    (&spec.source_district, &spec.target_district)
                } else {
                    (&spec.target_district, &spec.source_district)
                };
                let region_match = region == reference.region_for(from_district)
                    || c.target_region == reference.region_for(to_district);
                let direction_match = match spec.direction.as_deref() {
                    None | Some("bidirectional") => true,
                    Some(expected) => c.direction == expected,
                };
                if !region_match {
                    issues.push(Issue::warning(
                        IssueKind::RegionMismatch,
                        Subject::connection(&spec.source_room_id, &spec.target_room_id),
                        format!(
                            "found in {region} -> {}, expected {} -> {}",
                            c.target_region,
                            reference.region_for(&spec.source_district),
                            reference.region_for(&spec.target_district),
                        ),
                    ));
                }
                CriticalCheck {
                    expected: spec.clone(),
                    found: true,
                    actual: Some(MatchedConnection {
                        from: c.from.clone(),
                        to: c.to.clone(),
                        source_region: region.to_owned(),
                        target_region: c.target_region.clone(),
                        direction: c.direction.clone(),
                        connection_id: c.connection_id.clone(),
                    }),
                    region_match,
                    direction_match,
                }
            }
            None => {
                issues.push(Issue::error(
                    IssueKind::MissingCriticalConnection,
                    Subject::connection(&spec.source_room_id, &spec.target_room_id),
                    if spec.description.is_empty() {
                        "critical connection not found in any bundle".to_owned()
                    } else {
                        format!("critical connection not found: {}", spec.description)
                    },
                ));
                CriticalCheck {
                    expected: spec.clone(),
                    found: false,
                    actual: None,
                    region_match: false,
                    direction_match: false,
                }
            }
        };
        checks.push(check);
    }

    let total = checks.len();
    let found = checks.iter().filter(|c| c.found).count();
    let fully_valid = checks
        .iter()
        .filter(|c| c.found && c.region_match && c.direction_match)
        .count();

    CriticalResult {
        total,
        found,
        fully_valid,
        missing: total - found,
        validation_rate: percent(found, total),
        full_validation_rate: percent(fully_valid, total),
        checks,
        status: if found == total {
            Status::Pass
        } else {
            Status::Fail
        },
    }
}

/// Traffic-hub verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HubStatus {
    /// At least the expected number of connections.
    Verified,
    /// Some, but fewer than expected.
    Insufficient,
    /// None at all.
    Missing,
}

/// Expected versus actual cross-region connections of one hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubCheck {
    pub name: String,
    pub district: String,
    pub region: String,
    pub expected_connections: usize,
    pub actual_connections: usize,
    pub status: HubStatus,
}

/// Counts cross-region connections touching each expected hub.
///
/// A connection touches a hub when one of its endpoints lies in the hub's
/// region and that room's id or name equals the hub name.
pub fn check_hubs(
    split: &SplitData,
    reference: &CriticalReference,
    issues: &mut Vec<Issue>,
) -> Vec<HubCheck> {
    if reference.traffic_hubs.is_empty() {
        return Vec::new();
    }

    let rooms: HashMap<&str, (&str, &str)> = split_rooms(split)
        .map(|(region, _, room)| (room.id.as_str(), (region, room.name.as_str())))
        .collect();

    reference
        .traffic_hubs
        .iter()
        .map(|hub| {
            let region = reference.region_for(&hub.district);
            let is_hub = |id: &str| {
                rooms
                    .get(id)
                    .is_some_and(|(r, name)| *r == region && (id == hub.name || *name == hub.name))
            };
            let actual = split_cross_region(split)
                .filter(|(_, c)| is_hub(&c.from) || is_hub(&c.to))
                .count();
            let status = if actual == 0 {
                HubStatus::Missing
            } else if actual < hub.connections {
                HubStatus::Insufficient
            } else {
                HubStatus::Verified
            };
            match status {
                HubStatus::Missing => issues.push(Issue::warning(
                    IssueKind::HubMissing,
                    Subject::region(region),
                    format!("traffic hub {:?} has no cross-region connections", hub.name),
                )),
                HubStatus::Insufficient => issues.push(Issue::warning(
                    IssueKind::HubInsufficient,
                    Subject::region(region),
                    format!(
                        "traffic hub {:?} has {actual} cross-region connection(s), expected {}",
                        hub.name, hub.connections
                    ),
                )),
                HubStatus::Verified => {}
            }
            HubCheck {
                name: hub.name.clone(),
                district: hub.district.clone(),
                region: region.to_owned(),
                expected_connections: hub.connections,
                actual_connections: actual,
                status,
            }
        })
        .collect()
}
