/// Graph reachability over a [`RoomGraph`].
///
/// # Direction
///
/// Every traversal accepts a [`Direction`] parameter controlling which edges are
/// followed:
/// - [`Direction::Forward`]: outgoing exits only.
/// - [`Direction::Backward`]: incoming exits only.
/// - [`Direction::Both`]: exits in either direction (undirected view, used for
///   connected components).
///
/// Traversal uses an explicit `VecDeque` worklist, so memory is bounded by the
/// frontier and there is no recursion depth to exhaust on large worlds.
use std::collections::{HashSet, VecDeque};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::graph::RoomGraph;


/// Controls which edges are followed during graph traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow outgoing exits only.
    Forward,
    /// Follow incoming exits only.
    Backward,
    /// Follow exits in either direction, treating the graph as undirected.
    Both,
}

/// Errors that can occur during graph queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A room id supplied to a query does not exist in the graph.
    RoomNotFound(String),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::RoomNotFound(id) => write!(f, "room not found: {id:?}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Fills `buf` with the rooms reachable from `node` in one step.
///
/// The buffer is cleared first so a single allocation can be reused across
/// the whole traversal.
fn neighbours_into(
    graph: &RoomGraph,
    node: NodeIndex,
    direction: Direction,
    buf: &mut Vec<NodeIndex>,
) {
    buf.clear();
    let g = graph.graph();

    match direction {
        Direction::Forward => {
            buf.extend(g.edges(node).map(|e| e.target()));
        }
        Direction::Backward => {
            buf.extend(
                g.edges_directed(node, petgraph::Direction::Incoming)
                    .map(|e| e.source()),
            );
        }
        Direction::Both => {
            buf.extend(g.edges(node).map(|e| e.target()));
            buf.extend(
                g.edges_directed(node, petgraph::Direction::Incoming)
                    .map(|e| e.source()),
            );
        }
    }
}

/// Returns the set of all rooms reachable from `start` via BFS.
///
/// The start room itself is excluded from the result.
///
/// # Errors
///
/// Returns [`QueryError::RoomNotFound`] if `start` does not exist in the graph.
pub fn reachable_from(
    graph: &RoomGraph,
    start: &str,
    direction: Direction,
) -> Result<HashSet<NodeIndex>, QueryError> {
    let start_idx = graph
        .node_index(start)
        .ok_or_else(|| QueryError::RoomNotFound(start.to_owned()))?;

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    let mut nbuf: Vec<NodeIndex> = Vec::new();

    visited.insert(start_idx);
    queue.push_back(start_idx);

    while let Some(current) = queue.pop_front() {
        neighbours_into(graph, current, direction, &mut nbuf);
        for &neighbour in &nbuf {
            if visited.insert(neighbour) {
                queue.push_back(neighbour);
            }
        }
    }

    visited.remove(&start_idx);

    Ok(visited)
}

/// Returns the room ids reachable from `start` (start excluded), sorted.
///
/// # Errors
///
/// Returns [`QueryError::RoomNotFound`] if `start` does not exist in the graph.
pub fn reachable_ids(
    graph: &RoomGraph,
    start: &str,
    direction: Direction,
) -> Result<Vec<String>, QueryError> {
    let set = reachable_from(graph, start, direction)?;
    let mut ids: Vec<String> = set
        .into_iter()
        .filter_map(|idx| graph.node_weight(idx).map(|n| n.room_id.clone()))
        .collect();
    ids.sort_unstable();
    Ok(ids)
}
