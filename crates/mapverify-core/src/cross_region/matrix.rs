//! Connection matrix and quality metrics over cross-region connections.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grade::{clamp_score, mean};
use crate::model::{SplitData, split_cross_region};

/// Per-region inbound and outbound connection counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDistribution {
    pub outbound: usize,
    pub inbound: usize,
    pub total: usize,
}

/// Endpoint pairs served by more than one connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redundancy {
    /// Distinct unordered endpoint pairs.
    pub total_unique_paths: usize,
    pub redundant_pairs: usize,
    /// `redundant_pairs / total_unique_paths` as a percentage.
    pub redundancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMatrix {
    /// Bundle region ids, sorted.
    pub regions: Vec<String>,
    /// `counts[from][to]`: connections declared by `from` towards `to`.
    /// Zero cells are omitted.
    pub counts: BTreeMap<String, BTreeMap<String, usize>>,
    pub total_connections: usize,
    /// Unordered region pairs joined in at least one direction.
    pub connected_region_pairs: usize,
    /// Connected ordered pairs over `n·(n−1)`, as a percentage.
    pub connectivity_density: f64,
    /// Connections per `direction` value.
    pub connection_types: BTreeMap<String, usize>,
    pub region_distribution: BTreeMap<String, RegionDistribution>,
    /// 100 − coefficient of variation ×100 of per-region totals.
    pub consistency_score: f64,
    pub redundancy: Redundancy,
    /// min/max outbound connections per bundle; 0 when any bundle has none.
    pub balance_coefficient: f64,
}

/// Tallies the matrix and derived quality metrics.
///
/// Worlds with fewer than two regions score 100 on density and consistency.
pub fn build(split: &SplitData) -> ConnectionMatrix {
    let regions: Vec<String> = split.keys().cloned().collect();
    let n = regions.len();

    let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut connection_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut distribution: BTreeMap<String, RegionDistribution> = regions
        .iter()
        .map(|r| (r.clone(), RegionDistribution::default()))
        .collect();
    let mut endpoint_pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut total_connections = 0usize;

    for (region, c) in split_cross_region(split) {
        total_connections += 1;
        *counts
            .entry(region.to_owned())
            .or_default()
            .entry(c.target_region.clone())
            .or_default() += 1;

        let kind = if c.direction.is_empty() {
            "bidirectional".to_owned()
        } else {
            c.direction.clone()
        };
        *connection_types.entry(kind).or_default() += 1;

        let out = distribution.entry(region.to_owned()).or_default();
        out.outbound += 1;
        out.total += 1;
        let inc = distribution.entry(c.target_region.clone()).or_default();
        inc.inbound += 1;
        inc.total += 1;

        let key = if c.from <= c.to {
            (c.from.as_str(), c.to.as_str())
        } else {
            (c.to.as_str(), c.from.as_str())
        };
        *endpoint_pairs.entry(key).or_default() += 1;
    }

    let connected = |a: &str, b: &str| {
        counts
            .get(a)
            .and_then(|row| row.get(b))
            .is_some_and(|&k| k > 0)
    };

    let mut ordered_pairs = 0usize;
    let mut connected_region_pairs = 0usize;
    for (i, a) in regions.iter().enumerate() {
        for b in regions.iter().skip(i + 1) {
            let ab = connected(a, b);
            let ba = connected(b, a);
            ordered_pairs += usize::from(ab) + usize::from(ba);
            if ab || ba {
                connected_region_pairs += 1;
            }
        }
    }
    let connectivity_density = if n < 2 {
        100.0
    } else {
        ordered_pairs as f64 / (n * (n - 1)) as f64 * 100.0
    };

    let totals: Vec<f64> = distribution.values().map(|d| d.total as f64).collect();
    let consistency_score = if n < 2 {
        100.0
    } else {
        consistency(&totals)
    };

    let redundant_pairs = endpoint_pairs.values().filter(|&&k| k > 1).count();
    let redundancy = Redundancy {
        total_unique_paths: endpoint_pairs.len(),
        redundant_pairs,
        redundancy_rate: if endpoint_pairs.is_empty() {
            0.0
        } else {
            redundant_pairs as f64 / endpoint_pairs.len() as f64 * 100.0
        },
    };

    let outbound: Vec<usize> = split
        .values()
        .map(|b| b.cross_region_connections().len())
        .collect();
    let min = outbound.iter().copied().min().unwrap_or(0);
    let max = outbound.iter().copied().max().unwrap_or(0);
    let balance_coefficient = if min > 0 {
        min as f64 / max as f64
    } else {
        0.0
    };

    ConnectionMatrix {
        regions,
        counts,
        total_connections,
        connected_region_pairs,
        connectivity_density,
        connection_types,
        region_distribution: distribution,
        consistency_score,
        redundancy,
        balance_coefficient,
    }
}

/// `100 − σ/μ·100` clamped to `0..=100`; 0 when the mean is zero.
pub fn consistency(values: &[f64]) -> f64 {
    let Some(mu) = mean(values) else {
        return 0.0;
    };
    if mu <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    clamp_score(100.0 - variance.sqrt() / mu * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{bundle, healthy_world, room, split_of};

    #[test]
    fn mirrored_pair_is_dense_and_consistent() {
        let m = build(&healthy_world().split);
        assert_eq!(m.total_connections, 2);
        assert_eq!(m.connected_region_pairs, 1);
        assert!((m.connectivity_density - 100.0).abs() < f64::EPSILON);
        assert!((m.consistency_score - 100.0).abs() < f64::EPSILON);
        assert!((m.balance_coefficient - 1.0).abs() < f64::EPSILON);
        assert_eq!(m.counts["west"]["east"], 1);
        assert_eq!(m.connection_types.get("east"), Some(&1));
        // w2<->e1 is one unordered pair served twice.
        assert_eq!(m.redundancy.total_unique_paths, 1);
        assert_eq!(m.redundancy.redundant_pairs, 1);
    }

    #[test]
    fn one_way_region_link_halves_density() {
        let split = split_of(vec![
            ("a", bundle("a", vec![room("a1", &[("e", "b1")])])),
            ("b", bundle("b", vec![room("b1", &[])])),
        ]);
        let m = build(&split);
        assert!((m.connectivity_density - 50.0).abs() < f64::EPSILON);
        assert!((m.balance_coefficient - 0.0).abs() < f64::EPSILON);
        assert_eq!(m.region_distribution["b"].inbound, 1);
    }

    #[test]
    fn consistency_drops_with_spread() {
        assert!((consistency(&[4.0, 4.0, 4.0]) - 100.0).abs() < f64::EPSILON);
        assert!((consistency(&[0.0, 0.0]) - 0.0).abs() < f64::EPSILON);
        // mean 2, σ 2 => 0
        assert!((consistency(&[0.0, 4.0]) - 0.0).abs() < 1e-9);
        // mean 3, σ 1 => 66.67
        assert!((consistency(&[2.0, 4.0]) - (100.0 - 100.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn single_region_is_trivially_dense() {
        let split = split_of(vec![("solo", bundle("solo", vec![room("s", &[])]))]);
        let m = build(&split);
        assert!((m.connectivity_density - 100.0).abs() < f64::EPSILON);
        assert!((m.consistency_score - 100.0).abs() < f64::EPSILON);
    }
}
