//! Post-operation invariant checkers for correctness validation.

use std::collections::{BTreeSet, HashSet};

use mapverify_core::RoomGraph;
use mapverify_core::model::{SourceDataset, SplitData, split_rooms};
use petgraph::stable_graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};

/// Verifies graph construction invariants against the split it was built
/// from:
/// - one node per distinct room id, each indexed
/// - resolved plus dangling exits account for every declared exit
pub fn check_graph_invariants(split: &SplitData, graph: &RoomGraph) -> Result<(), String> {
    let ids: BTreeSet<&str> = split_rooms(split).map(|(_, _, r)| r.id.as_str()).collect();
    if graph.node_count() != ids.len() {
        return Err(format!(
            "node count mismatch: graph={}, split={}",
            graph.node_count(),
            ids.len()
        ));
    }
    for id in &ids {
        if graph.node_index(id).is_none() {
            return Err(format!("room {id} not found in graph index"));
        }
    }
    let declared: usize = split_rooms(split).map(|(_, _, r)| r.exits.len()).sum();
    let accounted = graph.edge_count() + graph.dangling_exits().len();
    if accounted != declared {
        return Err(format!(
            "exit count mismatch: edges+dangling={accounted}, declared={declared}"
        ));
    }
    Ok(())
}

/// Verifies that connected components partition the rooms and agree with
/// an independent union-find count over the undirected view.
pub fn check_components(graph: &RoomGraph, components: &[Vec<String>]) -> Result<(), String> {
    let mut seen: HashSet<&str> = HashSet::new();
    for component in components {
        if component.is_empty() {
            return Err("empty component".to_owned());
        }
        for id in component {
            if !seen.insert(id.as_str()) {
                return Err(format!("room {id} appears in more than one component"));
            }
        }
    }
    if seen.len() != graph.node_count() {
        return Err(format!(
            "components cover {} rooms, graph has {}",
            seen.len(),
            graph.node_count()
        ));
    }
    let expected = union_find_components(graph);
    if components.len() != expected {
        return Err(format!(
            "component count mismatch: got {}, union-find={expected}",
            components.len()
        ));
    }
    Ok(())
}

/// Counts weakly connected components with petgraph's union-find.
fn union_find_components(graph: &RoomGraph) -> usize {
    let g = graph.graph();
    let mut sets: UnionFind<usize> = UnionFind::new(NodeIndexable::node_bound(g));
    for edge in IntoEdgeReferences::edge_references(g) {
        sets.union(edge.source().index(), edge.target().index());
    }
    g.node_indices()
        .map(|idx| sets.find(idx.index()))
        .collect::<HashSet<usize>>()
        .len()
}

/// Verifies that a `reachable_from` result is a subset of all graph nodes
/// and excludes the start room.
pub fn check_reachable_excludes_start(
    graph: &RoomGraph,
    start: &str,
    reachable: &HashSet<NodeIndex>,
) -> Result<(), String> {
    let start_idx = graph
        .node_index(start)
        .ok_or_else(|| format!("start room {start} not found"))?;
    if reachable.contains(&start_idx) {
        return Err("reachable set should not contain start room".to_owned());
    }
    if reachable.len() >= graph.node_count() {
        return Err("reachable set larger than the other rooms".to_owned());
    }
    if let Some(stray) = reachable.iter().find(|idx| graph.node_weight(**idx).is_none()) {
        return Err(format!("reachable set holds unknown index {}", stray.index()));
    }
    Ok(())
}

/// Verifies that partitioning kept every source room exactly once.
pub fn check_partition_preserves_rooms(
    source: &SourceDataset,
    split: &SplitData,
) -> Result<(), String> {
    let mut source_ids: Vec<&str> = source.rooms().map(|(_, _, r)| r.id.as_str()).collect();
    let mut split_ids: Vec<&str> = split_rooms(split).map(|(_, _, r)| r.id.as_str()).collect();
    source_ids.sort_unstable();
    split_ids.sort_unstable();
    if source_ids != split_ids {
        return Err(format!(
            "room sets differ: source has {}, split has {}",
            source_ids.len(),
            split_ids.len()
        ));
    }
    let declared: usize = split
        .values()
        .map(|b| b.region.as_ref().and_then(|r| r.room_count).unwrap_or_default())
        .sum();
    if declared != split_ids.len() {
        return Err(format!(
            "declared roomCount total {declared} differs from {} rooms",
            split_ids.len()
        ));
    }
    Ok(())
}

/// Verifies that every cross-region connection has a reverse record.
pub fn check_cross_region_symmetry(split: &SplitData) -> Result<(), String> {
    let pairs: HashSet<(&str, &str)> = split
        .values()
        .flat_map(|b| b.cross_region_connections())
        .map(|c| (c.from.as_str(), c.to.as_str()))
        .collect();
    match pairs.iter().find(|(from, to)| !pairs.contains(&(*to, *from))) {
        Some((from, to)) => Err(format!("connection {from} -> {to} has no reverse")),
        None => Ok(()),
    }
}
