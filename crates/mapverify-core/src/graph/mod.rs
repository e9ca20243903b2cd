/// Room graph construction from region bundles using `petgraph`, plus queries.
///
/// [`RoomGraph::build`] wraps a `StableDiGraph` whose nodes are rooms and
/// whose edges are single directions of single exits. Every edge is tagged
/// [`EdgeKind::Internal`] or [`EdgeKind::CrossRegion`] depending on whether its
/// endpoints belong to the same bundle.
///
/// # Two-Pass Construction
///
/// 1. **Node pass**: inserts every room of every bundle and records the
///    `room id → NodeIndex` mapping. A room id seen twice keeps its first
///    occurrence; the duplicate is reported by the data integrity suite, not
///    here.
/// 2. **Edge pass**: resolves each exit target. Targets that do not resolve
///    are recorded as [`DanglingExit`]s instead of failing construction.
///
/// # Queries
///
/// See the [`queries`] submodule for reachability and the lookups used by the
/// query benchmark.
pub mod queries;

pub use queries::{Direction, QueryError, reachable_from};

use std::collections::{BTreeMap, HashMap};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::model::SplitData;

/// Weight stored on each room node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomNode {
    /// Room identifier.
    pub room_id: String,
    /// Display name.
    pub name: String,
    /// Type tag.
    pub room_type: String,
    /// Split-data key of the owning bundle.
    pub region_id: String,
    /// Owning location id.
    pub location_id: String,
}

/// Whether an edge stays inside its bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Both endpoints in the same bundle.
    Internal,
    /// Endpoints in different bundles.
    CrossRegion,
}

/// Weight stored on each exit edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEdge {
    /// Exit direction as written in the room's `exits` map.
    pub direction: String,
    /// Internal or cross-region.
    pub kind: EdgeKind,
}

/// An exit whose target room is not present in any bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingExit {
    /// Room declaring the exit.
    pub from: String,
    /// Exit direction.
    pub direction: String,
    /// The unresolved target id.
    pub target: String,
}

/// One outgoing exit as seen from its source room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitView {
    /// Exit direction.
    pub direction: String,
    /// Target room id.
    pub target: String,
    /// Internal or cross-region.
    pub kind: EdgeKind,
    /// Whether the target has any exit leading back to the source.
    pub has_reverse: bool,
}

/// Aggregate counts for one region, captured during construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    /// Region id.
    pub region_id: String,
    /// Rooms declared by the bundle.
    pub total_rooms: usize,
    /// Locations declared by the bundle.
    pub total_locations: usize,
    /// Internal + cross-region connections declared by the bundle.
    pub total_connections: usize,
}

/// A directed room multigraph built from region bundles.
///
/// Construct with [`RoomGraph::build`]. Node indices are stable; the graph is
/// never mutated after construction.
#[derive(Debug, Default)]
pub struct RoomGraph {
    graph: StableDiGraph<RoomNode, ExitEdge>,
    id_to_index: HashMap<String, NodeIndex>,
    name_to_index: HashMap<String, NodeIndex>,
    dangling: Vec<DanglingExit>,
    regions: BTreeMap<String, RegionStats>,
}

impl RoomGraph {
    /// Builds the graph from every room of every bundle.
    ///
    /// Construction is O(R + X) where R is room count and X is exit count and
    /// never fails.
    pub fn build(split: &SplitData) -> RoomGraph {
        let mut rg = RoomGraph::default();

        // --- Pass 1: rooms ---
        for (region_id, bundle) in split {
            rg.regions.insert(
                region_id.clone(),
                RegionStats {
                    region_id: region_id.clone(),
                    total_rooms: bundle.room_count(),
                    total_locations: bundle.locations().len(),
                    total_connections: bundle.internal_connections().len()
                        + bundle.cross_region_connections().len(),
                },
            );
            for (location, room) in bundle.rooms() {
                if rg.id_to_index.contains_key(&room.id) {
                    continue;
                }
                let idx = rg.graph.add_node(RoomNode {
                    room_id: room.id.clone(),
                    name: room.name.clone(),
                    room_type: room.room_type.clone(),
                    region_id: region_id.clone(),
                    location_id: location.id.clone(),
                });
                rg.id_to_index.insert(room.id.clone(), idx);
                rg.name_to_index.entry(room.name.clone()).or_insert(idx);
            }
        }

        // --- Pass 2: exits ---
        for (region_id, bundle) in split {
            for (_, room) in bundle.rooms() {
                let Some(&from_idx) = rg.id_to_index.get(&room.id) else {
                    continue;
                };
                // A duplicate room in a later bundle does not own the node.
                if rg.graph[from_idx].region_id != *region_id {
                    continue;
                }
                for (direction, target) in &room.exits {
                    match rg.id_to_index.get(target) {
                        Some(&to_idx) => {
                            let kind = if rg.graph[to_idx].region_id == *region_id {
                                EdgeKind::Internal
                            } else {
                                EdgeKind::CrossRegion
                            };
                            rg.graph.add_edge(
                                from_idx,
                                to_idx,
                                ExitEdge {
                                    direction: direction.clone(),
                                    kind,
                                },
                            );
                        }
                        None => rg.dangling.push(DanglingExit {
                            from: room.id.clone(),
                            direction: direction.clone(),
                            target: target.clone(),
                        }),
                    }
                }
            }
        }

        tracing::debug!(
            rooms = rg.node_count(),
            exits = rg.edge_count(),
            dangling = rg.dangling.len(),
            "room graph built"
        );
        rg
    }

    /// Returns the number of rooms.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of resolved exits.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Looks up the [`NodeIndex`] of a room id.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Returns the [`RoomNode`] at `idx`.
    pub fn node_weight(&self, idx: NodeIndex) -> Option<&RoomNode> {
        self.graph.node_weight(idx)
    }

    /// Returns the [`ExitEdge`] at `idx`.
    pub fn edge_weight(&self, idx: EdgeIndex) -> Option<&ExitEdge> {
        self.graph.edge_weight(idx)
    }

    /// Returns the underlying [`StableDiGraph`].
    pub fn graph(&self) -> &StableDiGraph<RoomNode, ExitEdge> {
        &self.graph
    }

    /// Exits whose targets were not found.
    pub fn dangling_exits(&self) -> &[DanglingExit] {
        &self.dangling
    }

    /// All room ids in ascending order.
    pub fn room_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.id_to_index.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Total in + out edges of a room.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
            + self
                .graph
                .edges_directed(idx, petgraph::Direction::Incoming)
                .count()
    }

    /// Outgoing edges of a room.
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Whether an edge runs from `from` to `to`.
    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.graph.find_edge(from, to).is_some()
    }

    /// Returns every outgoing exit of `id`, annotated with reverse-edge
    /// presence.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RoomNotFound`] if `id` is not in the graph.
    pub fn outgoing(&self, id: &str) -> Result<Vec<ExitView>, QueryError> {
        let idx = self
            .node_index(id)
            .ok_or_else(|| QueryError::RoomNotFound(id.to_owned()))?;
        let mut exits: Vec<ExitView> = self
            .graph
            .edges(idx)
            .map(|e| ExitView {
                direction: e.weight().direction.clone(),
                target: self.graph[e.target()].room_id.clone(),
                kind: e.weight().kind,
                has_reverse: self.has_edge(e.target(), idx),
            })
            .collect();
        exits.sort_by(|a, b| a.direction.cmp(&b.direction));
        Ok(exits)
    }

    /// Looks up a room by id.
    pub fn find_room_by_id(&self, id: &str) -> Option<&RoomNode> {
        self.node_index(id).and_then(|idx| self.node_weight(idx))
    }

    /// Looks up the first room with the given display name.
    pub fn find_room_by_name(&self, name: &str) -> Option<&RoomNode> {
        self.name_to_index
            .get(name)
            .and_then(|&idx| self.node_weight(idx))
    }

    /// Aggregate counts for one region.
    pub fn region_stats(&self, region_id: &str) -> Option<&RegionStats> {
        self.regions.get(region_id)
    }

    /// Region ids in ascending order.
    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}
