//! Lookup workload for the `queryPerformance` operation.
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::thresholds::query_grade;
use crate::grade::Grade;
use crate::graph::RoomGraph;

/// A fixed batch of lookups sampled from one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWorkload {
    ids: Vec<String>,
    names: Vec<String>,
    regions: Vec<String>,
}

impl QueryWorkload {
    /// Samples `id_lookups` room ids and `name_lookups` room names (with
    /// replacement) plus every region id, using a seeded RNG so the same
    /// graph always yields the same batch.
    pub fn sample(graph: &RoomGraph, id_lookups: usize, name_lookups: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let room_ids = graph.room_ids();
        let ids = (0..id_lookups)
            .filter_map(|_| room_ids.choose(&mut rng).map(|id| (*id).to_owned()))
            .collect();
        let names = (0..name_lookups)
            .filter_map(|_| {
                room_ids
                    .choose(&mut rng)
                    .and_then(|id| graph.find_room_by_id(id))
                    .map(|node| node.name.clone())
            })
            .collect();
        let regions = graph.region_ids().map(str::to_owned).collect();
        Self {
            ids,
            names,
            regions,
        }
    }

    /// Total number of lookups in one batch.
    pub fn len(&self) -> usize {
        self.ids.len() + self.names.len() + self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Executes the batch and returns how many lookups found something.
    pub fn run(&self, graph: &RoomGraph) -> usize {
        let by_id = self
            .ids
            .iter()
            .filter(|id| graph.find_room_by_id(id).is_some())
            .count();
        let by_name = self
            .names
            .iter()
            .filter(|name| graph.find_room_by_name(name).is_some())
            .count();
        let by_region = self
            .regions
            .iter()
            .filter(|region| graph.region_stats(region).is_some())
            .count();
        by_id + by_name + by_region
    }
}

/// Throughput view of the lookup benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBenchmark {
    pub id_lookups: usize,
    pub name_lookups: usize,
    pub region_queries: usize,
    pub total_queries: usize,
    /// Mean time of one batch in ms.
    pub batch_time_ms: f64,
    pub throughput_qps: f64,
    pub average_latency_ms: f64,
    pub grade: Grade,
}

impl QueryBenchmark {
    /// Derives throughput and latency from the mean batch time.
    pub fn from_batch(workload: &QueryWorkload, batch_time_ms: f64) -> Self {
        let total = workload.len();
        // Clocks can report zero for tiny batches.
        let seconds = (batch_time_ms / 1000.0).max(1e-9);
        let (throughput_qps, average_latency_ms) = if total == 0 {
            (0.0, 0.0)
        } else {
            (total as f64 / seconds, batch_time_ms / total as f64)
        };
        Self {
            id_lookups: workload.ids.len(),
            name_lookups: workload.names.len(),
            region_queries: workload.regions.len(),
            total_queries: total,
            batch_time_ms,
            throughput_qps,
            average_latency_ms,
            grade: query_grade(throughput_qps, average_latency_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::healthy_world;

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let graph = RoomGraph::build(&healthy_world().split);
        let a = QueryWorkload::sample(&graph, 20, 10, 42);
        let b = QueryWorkload::sample(&graph, 20, 10, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 20 + 10 + 2);
    }

    #[test]
    fn every_sampled_lookup_hits() {
        let graph = RoomGraph::build(&healthy_world().split);
        let workload = QueryWorkload::sample(&graph, 20, 10, 7);
        assert_eq!(workload.run(&graph), workload.len());
    }

    #[test]
    fn empty_graph_yields_empty_workload() {
        let graph = RoomGraph::build(&crate::model::SplitData::new());
        let workload = QueryWorkload::sample(&graph, 20, 10, 42);
        assert!(workload.is_empty());
        let q = QueryBenchmark::from_batch(&workload, 0.0);
        assert_eq!(q.grade, Grade::F);
    }

    #[test]
    fn fast_batch_grades_a() {
        let graph = RoomGraph::build(&healthy_world().split);
        let workload = QueryWorkload::sample(&graph, 20, 10, 42);
        // 32 queries in 0.032 ms: 1 µs each.
        let q = QueryBenchmark::from_batch(&workload, 0.032);
        assert_eq!(q.grade, Grade::A);
        assert!(q.throughput_qps > 1000.0);
    }
}
