//! Region-level adjacency and hop distances.
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::grade::{Status, mean};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{SplitData, split_cross_region};

/// Shortest hop count between two regions; `None` when unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionPath {
    pub from: String,
    pub to: String,
    pub hops: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathComplexity {
    /// Number of adjacent regions.
    pub direct_connections: usize,
    /// `direct_connections / (regions - 1)`.
    pub connectivity_degree: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathAnalysis {
    pub region_count: usize,
    /// Cross-region connections contributing to adjacency.
    pub total_paths: usize,
    /// One entry per unordered region pair.
    pub paths: Vec<RegionPath>,
    pub unreachable_pairs: usize,
    pub average_path_length: f64,
    pub isolated_regions: Vec<String>,
    pub path_complexity: BTreeMap<String, PathComplexity>,
    pub status: Status,
}

/// Breadth-first hop counts from `start` to every region it reaches.
fn hop_distances<'a>(
    graph: &UnGraphMap<&'a str, ()>,
    start: &'a str,
) -> HashMap<&'a str, usize> {
    let mut distances = HashMap::from([(start, 0usize)]);
    let mut queue = VecDeque::from([start]);
    while let Some(region) = queue.pop_front() {
        let next = distances.get(region).copied().unwrap_or_default() + 1;
        for neighbor in graph.neighbors(region) {
            if let Entry::Vacant(slot) = distances.entry(neighbor) {
                slot.insert(next);
                queue.push_back(neighbor);
            }
        }
    }
    distances
}

/// Builds the region adjacency graph and computes every pairwise distance.
///
/// Regions are the bundle keys plus any `targetRegion` named by a
/// connection. A connection whose target region is its own bundle adds no
/// adjacency.
pub fn analyze(split: &SplitData, issues: &mut Vec<Issue>) -> PathAnalysis {
    let mut graph: UnGraphMap<&str, ()> = UnGraphMap::new();
    for region in split.keys() {
        graph.add_node(region.as_str());
    }
    let mut total_paths = 0usize;
    for (region, c) in split_cross_region(split) {
        graph.add_node(c.target_region.as_str());
        if region != c.target_region {
            graph.add_edge(region, c.target_region.as_str(), ());
            total_paths += 1;
        }
    }

    let mut regions: Vec<&str> = graph.nodes().collect();
    regions.sort_unstable();
    let n = regions.len();

    let mut paths = Vec::new();
    for (i, &from) in regions.iter().enumerate() {
        let distances = hop_distances(&graph, from);
        for &to in regions.iter().skip(i + 1) {
            paths.push(RegionPath {
                from: from.to_owned(),
                to: to.to_owned(),
                hops: distances.get(to).copied(),
            });
        }
    }

    let reachable: Vec<f64> = paths.iter().filter_map(|p| p.hops).map(|h| h as f64).collect();
    let unreachable_pairs = paths.len() - reachable.len();

    let mut isolated_regions = Vec::new();
    let mut path_complexity = BTreeMap::new();
    for &region in &regions {
        let degree = graph.neighbors(region).count();
        // A lone region has nothing to connect to.
        if degree == 0 && n > 1 {
            isolated_regions.push(region.to_owned());
            issues.push(Issue::warning(
                IssueKind::IsolatedRegion,
                Subject::region(region),
                "region has no cross-region connections",
            ));
        }
        path_complexity.insert(
            region.to_owned(),
            PathComplexity {
                direct_connections: degree,
                connectivity_degree: if n > 1 {
                    degree as f64 / (n - 1) as f64
                } else {
                    0.0
                },
            },
        );
    }

    let status = if isolated_regions.is_empty() {
        Status::Pass
    } else {
        Status::Partial
    };

    PathAnalysis {
        region_count: n,
        total_paths,
        paths,
        unreachable_pairs,
        average_path_length: mean(&reachable).unwrap_or(0.0),
        isolated_regions,
        path_complexity,
        status,
    }
}
