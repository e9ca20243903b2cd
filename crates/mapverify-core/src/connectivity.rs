//! Connected components, isolated rooms and degree statistics.
//!
//! Reachability treats every exit as undirected: two rooms are in the same
//! component if a path joins them in either direction. One-way exits therefore
//! never split a component on their own.
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::grade::{Status, clamp_score};
use crate::graph::{DanglingExit, Direction, EdgeKind, RoomGraph, reachable_from};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::SplitData;

/// Tuning knobs for [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityConfig {
    /// Upper bound on [`IssueKind::DisconnectedComponent`] issues emitted; the
    /// component list itself is never truncated.
    pub max_component_issues: usize,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            max_component_issues: 10,
        }
    }
}

/// Aggregate numbers computed alongside the components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStatistics {
    pub total_rooms: usize,
    /// Rooms with at least one incoming or outgoing exit.
    pub connected_rooms: usize,
    /// Rooms with no exits in either direction.
    pub unconnected_rooms: usize,
    pub average_out_degree: f64,
    pub internal_edges: usize,
    pub cross_region_edges: usize,
    pub dangling_exits: usize,
    pub rooms_per_region: BTreeMap<String, usize>,
    pub component_count: usize,
    pub largest_component: usize,
}

/// Everything the connectivity suite reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub status: Status,
    pub score: f64,
    /// True iff exactly one component spans all rooms.
    pub is_fully_connected: bool,
    /// Components, each sorted by room id, ordered by smallest member.
    pub components: Vec<Vec<String>>,
    pub isolated_rooms: Vec<String>,
    pub dangling_exits: Vec<DanglingExit>,
    pub statistics: ConnectivityStatistics,
    pub issues: Vec<Issue>,
    pub execution_time_ms: u64,
}

/// Partitions the rooms of `graph` into connected components.
///
/// Every room appears in exactly one component. The result does not depend
/// on node insertion order.
pub fn components(graph: &RoomGraph) -> Vec<Vec<String>> {
    let mut seen: HashSet<NodeIndex> = HashSet::new();
    let mut out: Vec<Vec<String>> = Vec::new();

    for id in graph.room_ids() {
        let Some(start) = graph.node_index(id) else {
            continue;
        };
        if seen.contains(&start) {
            continue;
        }
        let reached = reachable_from(graph, id, Direction::Both).unwrap_or_default();
        let mut members: Vec<String> = Vec::with_capacity(reached.len() + 1);
        members.push(id.to_owned());
        seen.insert(start);
        for idx in reached {
            seen.insert(idx);
            if let Some(node) = graph.node_weight(idx) {
                members.push(node.room_id.clone());
            }
        }
        members.sort_unstable();
        out.push(members);
    }
    out
}

/// Runs the connectivity suite over a built graph.
pub fn validate(graph: &RoomGraph, config: &ConnectivityConfig) -> ConnectivityReport {
    let started = Instant::now();
    let comps = components(graph);
    let is_fully_connected = comps.len() == 1;

    let mut isolated_rooms = Vec::new();
    let mut rooms_per_region: BTreeMap<String, usize> = BTreeMap::new();
    let mut out_degree_sum = 0usize;
    for id in graph.room_ids() {
        let Some(idx) = graph.node_index(id) else {
            continue;
        };
        if graph.degree(idx) == 0 {
            isolated_rooms.push(id.to_owned());
        }
        out_degree_sum += graph.out_degree(idx);
        if let Some(node) = graph.node_weight(idx) {
            *rooms_per_region.entry(node.region_id.clone()).or_default() += 1;
        }
    }

    let (mut internal_edges, mut cross_region_edges) = (0usize, 0usize);
    for edge in graph.graph().edge_weights() {
        match edge.kind {
            EdgeKind::Internal => internal_edges += 1,
            EdgeKind::CrossRegion => cross_region_edges += 1,
        }
    }

    let total_rooms = graph.node_count();
    let statistics = ConnectivityStatistics {
        total_rooms,
        connected_rooms: total_rooms - isolated_rooms.len(),
        unconnected_rooms: isolated_rooms.len(),
        average_out_degree: if total_rooms == 0 {
            0.0
        } else {
            out_degree_sum as f64 / total_rooms as f64
        },
        internal_edges,
        cross_region_edges,
        dangling_exits: graph.dangling_exits().len(),
        rooms_per_region,
        component_count: comps.len(),
        largest_component: comps.iter().map(Vec::len).max().unwrap_or(0),
    };

    let issues = collect_issues(graph, &comps, &isolated_rooms, config);
    let status = status_of(is_fully_connected, !graph.dangling_exits().is_empty());
    let score = score_of(
        is_fully_connected,
        !isolated_rooms.is_empty(),
        !graph.dangling_exits().is_empty(),
    );

    tracing::debug!(
        components = statistics.component_count,
        isolated = statistics.unconnected_rooms,
        dangling = statistics.dangling_exits,
        "connectivity validated"
    );

    ConnectivityReport {
        status,
        score,
        is_fully_connected,
        components: comps,
        isolated_rooms,
        dangling_exits: graph.dangling_exits().to_vec(),
        statistics,
        issues,
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

/// Builds the graph from `split` and validates it with default settings.
pub fn validate_split(split: &SplitData) -> ConnectivityReport {
    validate(&RoomGraph::build(split), &ConnectivityConfig::default())
}

fn collect_issues(
    graph: &RoomGraph,
    comps: &[Vec<String>],
    isolated: &[String],
    config: &ConnectivityConfig,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for d in graph.dangling_exits() {
        issues.push(Issue::warning(
            IssueKind::DanglingExit,
            Subject::connection(&d.from, &d.target),
            format!("exit {:?} points at unknown room {:?}", d.direction, d.target),
        ));
    }

    for id in isolated {
        issues.push(Issue::warning(
            IssueKind::IsolatedRoom,
            Subject::room(id),
            "room has no exits in either direction",
        ));
    }

    if comps.len() > 1 {
        // The largest component is the mainland; report the others.
        let largest = comps
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
            .map_or(0, |(i, _)| i);
        let islands = comps
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != largest)
            .map(|(_, c)| c);
        for comp in islands.take(config.max_component_issues) {
            let first = comp.first().map_or("", String::as_str);
            issues.push(Issue::error(
                IssueKind::DisconnectedComponent,
                Subject::room(first),
                format!(
                    "component of {} room(s) is unreachable from the main component",
                    comp.len()
                ),
            ));
        }
    }
    issues
}

/// FAIL when disconnected, PARTIAL when connected but some exits dangle.
pub fn status_of(is_fully_connected: bool, has_dangling: bool) -> Status {
    if !is_fully_connected {
        Status::Fail
    } else if has_dangling {
        Status::Partial
    } else {
        Status::Pass
    }
}

/// 100, −30 if disconnected, −20 if isolated rooms, −10 if dangling exits.
pub fn score_of(is_fully_connected: bool, has_isolated: bool, has_dangling: bool) -> f64 {
    let mut score = 100.0;
    if !is_fully_connected {
        score -= 30.0;
    }
    if has_isolated {
        score -= 20.0;
    }
    if has_dangling {
        score -= 10.0;
    }
    clamp_score(score)
}
