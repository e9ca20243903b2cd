//! Shared test helper functions for constructing test fixtures.
//!
//! This module is compiled only in test builds and provides common constructors
//! for [`Room`], [`RegionBundle`], [`SplitData`] and [`SourceDataset`] used
//! across unit test modules throughout `mapverify-core`.
//!
//! Integration tests in `crates/mapverify-core/tests/` define their own local
//! helpers because they link against the non-test library build where this
//! module is not available.
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;

use crate::model::{
    Connections, CrossRegionConnection, CriticalConnectionSpec, District, InternalConnection,
    Location, RegionBundle, RegionInfo, Room, SourceDataset, SplitData, TestData,
};

/// Creates a room named `"Room {id}"` of type `"room"` with the given exits.
pub fn room(id: &str, exits: &[(&str, &str)]) -> Room {
    Room {
        id: id.to_owned(),
        name: format!("Room {id}"),
        room_type: "room".to_owned(),
        exits: exits
            .iter()
            .map(|(d, t)| ((*d).to_owned(), (*t).to_owned()))
            .collect(),
        ..Room::default()
    }
}

/// Creates a bundle whose rooms all sit in one location `"{region}_loc"`.
///
/// The `connections` section is left empty; [`split_of`] derives it.
pub fn bundle(region: &str, rooms: Vec<Room>) -> RegionBundle {
    RegionBundle {
        region: Some(RegionInfo {
            id: region.to_owned(),
            name: format!("Region {region}"),
            region_type: "district".to_owned(),
            room_count: Some(rooms.len()),
            ..RegionInfo::default()
        }),
        locations: Some(vec![Location {
            id: format!("{region}_loc"),
            name: format!("Location {region}"),
            rooms: Some(rooms),
            ..Location::default()
        }]),
        connections: Some(Connections::default()),
        metadata: None,
        extra: BTreeMap::new(),
    }
}

/// Assembles split data and fills every bundle's `connections` section from
/// its room exits.
///
/// Exits to rooms of the same bundle become internal connections, exits to
/// rooms of another bundle become cross-region connections, and exits to
/// unknown rooms are left out.
pub fn split_of(bundles: Vec<(&str, RegionBundle)>) -> SplitData {
    let mut split: SplitData = bundles
        .into_iter()
        .map(|(id, b)| (id.to_owned(), b))
        .collect();

    let mut owner: BTreeMap<String, String> = BTreeMap::new();
    for (region, b) in &split {
        for (_, r) in b.rooms() {
            owner.entry(r.id.clone()).or_insert_with(|| region.clone());
        }
    }

    for (region, b) in &mut split {
        let mut connections = Connections::default();
        for (_, r) in b.rooms() {
            for (direction, target) in &r.exits {
                match owner.get(target) {
                    Some(t) if t == region => connections.internal.push(InternalConnection {
                        from: r.id.clone(),
                        to: target.clone(),
                        direction: direction.clone(),
                    }),
                    Some(t) => connections.cross_region.push(CrossRegionConnection {
                        from: r.id.clone(),
                        to: target.clone(),
                        target_region: t.clone(),
                        direction: direction.clone(),
                        connection_id: format!("{}_{}", r.id, target),
                    }),
                    None => {}
                }
            }
        }
        b.connections = Some(connections);
    }
    split
}

/// Builds a source dataset with one district per region of `split`, holding
/// the same rooms.
pub fn source_for(split: &SplitData) -> SourceDataset {
    SourceDataset {
        city: None,
        districts: Some(
            split
                .iter()
                .map(|(region, b)| District {
                    id: region.clone(),
                    name: region.clone(),
                    region: None,
                    locations: Some(b.locations().to_vec()),
                    extra: BTreeMap::new(),
                })
                .collect(),
        ),
        extra: BTreeMap::new(),
    }
}

/// A critical connection between two rooms whose districts are named after
/// their regions.
pub fn critical(
    source_id: &str,
    source_district: &str,
    target_id: &str,
    target_district: &str,
) -> CriticalConnectionSpec {
    CriticalConnectionSpec {
        source_room: format!("Room {source_id}"),
        source_room_id: source_id.to_owned(),
        source_district: source_district.to_owned(),
        target_room_id: target_id.to_owned(),
        target_district: target_district.to_owned(),
        target_room: format!("Room {target_id}"),
        direction: None,
        description: String::new(),
    }
}

/// A small consistent world: two regions, fully connected, every
/// cross-region exit mirrored, source identical to split.
///
/// ```text
/// west: w1 <-> w2      east: e1 <-> e2
///              w2 <-> e1
/// ```
pub fn healthy_world() -> TestData {
    let split = split_of(vec![
        (
            "west",
            bundle(
                "west",
                vec![
                    room("w1", &[("east", "w2")]),
                    room("w2", &[("west", "w1"), ("east", "e1")]),
                ],
            ),
        ),
        (
            "east",
            bundle(
                "east",
                vec![
                    room("e1", &[("west", "w2"), ("east", "e2")]),
                    room("e2", &[("west", "e1")]),
                ],
            ),
        ),
    ]);
    let source = source_for(&split);
    let mut data = TestData {
        source,
        split,
        ..TestData::default()
    };
    data.critical
        .critical_connections
        .push(critical("w2", "west", "e1", "east"));
    data
}
