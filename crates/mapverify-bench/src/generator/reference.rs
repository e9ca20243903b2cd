//! Critical-connection reference data for a generated world.
use std::collections::{BTreeMap, HashMap};

use mapverify_core::model::{CriticalConnectionSpec, CriticalReference, TrafficHub};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::GeneratorConfig;
use super::topology::WorldLayout;

/// Derives the reference document from the layout.
///
/// Critical connections are sampled from the cross-region links; hubs are
/// the rooms with the most cross-region links, expected at their exact
/// count.
pub fn build_reference(
    layout: &WorldLayout,
    config: &GeneratorConfig,
    rng: &mut StdRng,
) -> CriticalReference {
    let region_mapping: BTreeMap<String, String> = layout
        .districts
        .iter()
        .map(|d| (d.name.clone(), layout.region_ids[d.region].clone()))
        .collect();
    let district_name = |room: usize| layout.districts[layout.slots[room].district].name.clone();

    let mut sampled = layout.cross_links.clone();
    sampled.shuffle(rng);
    let critical_connections = sampled
        .iter()
        .take(config.num_critical)
        .map(|&(a, b)| {
            let (source, target) = (&layout.rooms[a], &layout.rooms[b]);
            let direction = source
                .exits
                .iter()
                .find(|(_, t)| **t == target.id)
                .map(|(d, _)| d.clone());
            CriticalConnectionSpec {
                source_room: source.name.clone(),
                source_room_id: source.id.clone(),
                source_district: district_name(a),
                target_room_id: target.id.clone(),
                target_district: district_name(b),
                target_room: target.name.clone(),
                direction,
                description: format!("{} to {}", source.name, target.name),
            }
        })
        .collect();

    // Each link yields a connection record on both sides, and both touch
    // both endpoints.
    let mut per_room: BTreeMap<usize, usize> = BTreeMap::new();
    for &(a, b) in &layout.cross_links {
        *per_room.entry(a).or_default() += 2;
        *per_room.entry(b).or_default() += 2;
    }
    let mut ranked: Vec<(usize, usize)> = per_room.into_iter().collect();
    ranked.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
    let traffic_hubs = ranked
        .into_iter()
        .take(config.num_hubs)
        .map(|(room, count)| TrafficHub {
            name: layout.rooms[room].id.clone(),
            district: district_name(room),
            connections: count,
        })
        .collect();

    let district_of: HashMap<&str, usize> = layout
        .rooms
        .iter()
        .zip(&layout.slots)
        .map(|(room, slot)| (room.id.as_str(), slot.district))
        .collect();
    let cross_district_connections = layout
        .rooms
        .iter()
        .zip(&layout.slots)
        .map(|(room, slot)| {
            room.exits
                .values()
                .filter(|target| {
                    district_of
                        .get(target.as_str())
                        .is_some_and(|d| *d != slot.district)
                })
                .count()
        })
        .sum();

    CriticalReference {
        total_connections: layout.exit_count(),
        cross_district_connections,
        critical_connections,
        traffic_hubs,
        region_mapping,
    }
}
