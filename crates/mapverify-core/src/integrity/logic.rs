//! Connection-record logic and room reliability metrics.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::grade::percent;
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::SplitData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicCheck {
    pub self_connections: usize,
    pub unknown_endpoints: usize,
}

/// Checks every connection record against the bundle that declares it.
///
/// - `from == to` is a warning.
/// - An internal connection needs both endpoints in the bundle.
/// - A cross-region connection needs its `from` in the bundle.
pub fn check_logic(split: &SplitData, issues: &mut Vec<Issue>) -> LogicCheck {
    let mut check = LogicCheck::default();
    for (region, bundle) in split {
        let local: HashSet<&str> = bundle.rooms().map(|(_, r)| r.id.as_str()).collect();

        let mut self_connection = |from: &str, to: &str| {
            if from == to {
                check.self_connections += 1;
                issues.push(Issue::warning(
                    IssueKind::SelfConnection,
                    Subject::connection(from, to),
                    "connection links a room to itself",
                ));
            }
        };
        for c in bundle.internal_connections() {
            self_connection(&c.from, &c.to);
        }
        for c in bundle.cross_region_connections() {
            self_connection(&c.from, &c.to);
        }

        for c in bundle.internal_connections() {
            for endpoint in [&c.from, &c.to] {
                if !local.contains(endpoint.as_str()) {
                    check.unknown_endpoints += 1;
                    issues.push(Issue::error(
                        IssueKind::UnknownEndpoint,
                        Subject::connection(&c.from, &c.to),
                        format!("internal connection endpoint {endpoint:?} is not in region {region}"),
                    ));
                }
            }
        }
        for c in bundle.cross_region_connections() {
            if !local.contains(c.from.as_str()) {
                check.unknown_endpoints += 1;
                issues.push(Issue::error(
                    IssueKind::UnknownEndpoint,
                    Subject::connection(&c.from, &c.to),
                    format!("cross-region connection source is not in region {region}"),
                ));
            }
        }
    }
    check
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityMetrics {
    pub total_rooms: usize,
    /// % rooms touched by at least one connection record.
    pub connectivity_rate: f64,
    /// % rooms touched by none.
    pub isolation_rate: f64,
    /// % rooms touched by two or more.
    pub well_connected_rate: f64,
    /// `0.4·connectivity + 0.4·(100 − isolation) + 0.2·wellConnected`.
    pub reliability_score: f64,
}

/// Counts, per room, the connection records of its own bundle that touch it.
pub fn reliability(split: &SplitData) -> ReliabilityMetrics {
    let (mut total, mut connected, mut well_connected) = (0usize, 0usize, 0usize);
    for bundle in split.values() {
        let mut touches: HashMap<&str, usize> = HashMap::new();
        let endpoints = bundle
            .internal_connections()
            .iter()
            .map(|c| (c.from.as_str(), c.to.as_str()))
            .chain(
                bundle
                    .cross_region_connections()
                    .iter()
                    .map(|c| (c.from.as_str(), c.to.as_str())),
            );
        for (from, to) in endpoints {
            *touches.entry(from).or_default() += 1;
            if to != from {
                *touches.entry(to).or_default() += 1;
            }
        }
        for (_, room) in bundle.rooms() {
            total += 1;
            let n = touches.get(room.id.as_str()).copied().unwrap_or(0);
            if n > 0 {
                connected += 1;
            }
            if n >= 2 {
                well_connected += 1;
            }
        }
    }

    if total == 0 {
        return ReliabilityMetrics::default();
    }
    let connectivity_rate = percent(connected, total);
    let isolation_rate = percent(total - connected, total);
    let well_connected_rate = percent(well_connected, total);
    ReliabilityMetrics {
        total_rooms: total,
        connectivity_rate,
        isolation_rate,
        well_connected_rate,
        reliability_score: 0.4 * connectivity_rate
            + 0.4 * (100.0 - isolation_rate)
            + 0.2 * well_connected_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InternalConnection;
    use crate::test_helpers::{bundle, healthy_world, room, split_of};

    #[test]
    fn consistent_bundles_have_no_logic_findings() {
        let mut issues = Vec::new();
        let check = check_logic(&healthy_world().split, &mut issues);
        assert_eq!(check, LogicCheck::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn foreign_endpoints_and_self_links_are_reported() {
        let mut split = split_of(vec![("a", bundle("a", vec![room("a1", &[("up", "a1")])]))]);
        if let Some(conns) = split.get_mut("a").and_then(|b| b.connections.as_mut()) {
            conns.internal.push(InternalConnection {
                from: "a1".to_owned(),
                to: "elsewhere".to_owned(),
                direction: "n".to_owned(),
            });
        }
        let mut issues = Vec::new();
        let check = check_logic(&split, &mut issues);
        assert_eq!(check.self_connections, 1);
        assert_eq!(check.unknown_endpoints, 1);
    }

    #[test]
    fn reliability_weights_rates() {
        // a1 <-> a2 mirrored, a3 alone
        let split = split_of(vec![(
            "a",
            bundle(
                "a",
                vec![
                    room("a1", &[("e", "a2")]),
                    room("a2", &[("w", "a1")]),
                    room("a3", &[]),
                ],
            ),
        )]);
        let m = reliability(&split);
        assert_eq!(m.total_rooms, 3);
        let two_thirds = 200.0 / 3.0;
        assert!((m.connectivity_rate - two_thirds).abs() < 1e-9);
        assert!((m.well_connected_rate - two_thirds).abs() < 1e-9);
        let expected = 0.4 * two_thirds + 0.4 * two_thirds + 0.2 * two_thirds;
        assert!((m.reliability_score - expected).abs() < 1e-9);
    }
}
