//! Reverse-edge audit over cross-region connections.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grade::Status;
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{SplitData, split_cross_region};

/// Counts from the bidirectional audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidirectionalResult {
    /// Distinct ordered `(from, to)` pairs.
    pub total_connections: usize,
    pub bidirectional_connections: usize,
    pub unidirectional_connections: usize,
    pub errors: usize,
    pub warnings: usize,
    pub status: Status,
}

/// Flags cross-region edges without a reverse counterpart (warning, unless
/// the edge's direction equals `one_way_marker`) and self-loops (error).
pub fn audit(split: &SplitData, one_way_marker: &str, issues: &mut Vec<Issue>) -> BidirectionalResult {
    // Later declarations of the same ordered pair replace earlier ones.
    let mut pairs: BTreeMap<(&str, &str), &str> = BTreeMap::new();
    for (_, c) in split_cross_region(split) {
        pairs.insert((c.from.as_str(), c.to.as_str()), c.direction.as_str());
    }

    let (mut errors, mut warnings, mut bidirectional) = (0usize, 0usize, 0usize);
    for (&(from, to), &direction) in &pairs {
        if pairs.contains_key(&(to, from)) {
            bidirectional += 1;
        } else if direction != one_way_marker {
            warnings += 1;
            issues.push(Issue::warning(
                IssueKind::MissingReverseConnection,
                Subject::connection(from, to),
                "cross-region connection has no reverse counterpart",
            ));
        }
        if from == to {
            errors += 1;
            issues.push(Issue::error(
                IssueKind::SelfLoop,
                Subject::connection(from, to),
                "cross-region connection starts and ends in the same room",
            ));
        }
    }

    BidirectionalResult {
        total_connections: pairs.len(),
        bidirectional_connections: bidirectional,
        unidirectional_connections: pairs.len() - bidirectional,
        errors,
        warnings,
        status: if errors == 0 { Status::Pass } else { Status::Fail },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CrossRegionConnection;
    use crate::test_helpers::{bundle, healthy_world, room, split_of};

    #[test]
    fn mirrored_world_has_no_findings() {
        let mut issues = Vec::new();
        let result = audit(&healthy_world().split, "oneway", &mut issues);
        assert_eq!(result.total_connections, 2);
        assert_eq!(result.bidirectional_connections, 2);
        assert_eq!(result.status, Status::Pass);
        assert!(issues.is_empty());
    }

    #[test]
    fn missing_reverse_warns_unless_one_way() {
        let mut split = split_of(vec![
            ("a", bundle("a", vec![room("x", &[("n", "y")]), room("z", &[])])),
            ("b", bundle("b", vec![room("y", &[])])),
        ]);
        if let Some(conns) = split.get_mut("a").and_then(|b| b.connections.as_mut()) {
            conns.cross_region.push(CrossRegionConnection {
                from: "z".to_owned(),
                to: "y".to_owned(),
                target_region: "b".to_owned(),
                direction: "oneway".to_owned(),
                connection_id: "z_y".to_owned(),
            });
        }
        let mut issues = Vec::new();
        let result = audit(&split, "oneway", &mut issues);
        assert_eq!(result.unidirectional_connections, 2);
        assert_eq!(result.warnings, 1);
        assert_eq!(result.status, Status::Pass);
        assert_eq!(issues[0].subject, Subject::connection("x", "y"));
    }

    #[test]
    fn self_loop_is_an_error() {
        let mut split = split_of(vec![("a", bundle("a", vec![room("x", &[])]))]);
        if let Some(conns) = split.get_mut("a").and_then(|b| b.connections.as_mut()) {
            conns.cross_region.push(CrossRegionConnection {
                from: "x".to_owned(),
                to: "x".to_owned(),
                target_region: "b".to_owned(),
                direction: "up".to_owned(),
                connection_id: "loop".to_owned(),
            });
        }
        let mut issues = Vec::new();
        let result = audit(&split, "oneway", &mut issues);
        assert_eq!(result.errors, 1);
        assert_eq!(result.status, Status::Fail);
        assert!(issues.iter().any(|i| i.kind == IssueKind::SelfLoop));
    }
}
