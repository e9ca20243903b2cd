//! Input documents: the monolithic source dataset, the per-region bundles
//! produced by partitioning, and the critical-connection reference data.
//!
//! Every record keeps its required fields as plain strings with
//! `#[serde(default)]` so that a document with a missing field still
//! deserializes; the data integrity checks then report the empty field as a
//! format error instead of the whole document failing to parse. Sections whose
//! absence is a structural problem (`districts`, `locations`, `rooms`,
//! `region`, `connections`) are `Option`s so that absence is distinguishable
//! from emptiness.
//!
//! Unknown fields are preserved in `extra` maps so that round-tripping a
//! bundle through [`crate::integration`] region-file emission is lossless.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Region id → bundle. Ordered so every traversal over regions is
/// deterministic.
pub type SplitData = BTreeMap<String, RegionBundle>;

// ---------------------------------------------------------------------------
// Rooms and locations (shared by source and bundles)
// ---------------------------------------------------------------------------

/// Planar map coordinates of a room.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

/// An atomic node of the world graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Room {
    /// Globally unique room identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form type tag (`"street"`, `"shop"`, ...).
    #[serde(rename = "type", default)]
    pub room_type: String,
    /// Optional long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional map position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Direction → target room id.
    #[serde(default)]
    pub exits: BTreeMap<String, String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A named group of rooms inside a district or region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Location identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Rooms of this location; `None` when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<Room>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Location {
    /// Rooms of this location, empty when the field is absent.
    pub fn rooms(&self) -> &[Room] {
        self.rooms.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Source dataset
// ---------------------------------------------------------------------------

/// A district of the monolithic source dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct District {
    /// District identifier.
    #[serde(default)]
    pub id: String,
    /// Display name; also the key used by region mappings.
    #[serde(default)]
    pub name: String,
    /// Explicit target region, overriding any mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Locations of this district; `None` when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl District {
    /// Locations of this district, empty when the field is absent.
    pub fn locations(&self) -> &[Location] {
        self.locations.as_deref().unwrap_or(&[])
    }
}

/// The pre-partition world document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceDataset {
    /// City header block, opaque to verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<Value>,
    /// Top-level district list; `None` when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub districts: Option<Vec<District>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SourceDataset {
    /// Districts of the dataset, empty when the field is absent.
    pub fn districts(&self) -> &[District] {
        self.districts.as_deref().unwrap_or(&[])
    }

    /// Iterates every room together with its district and location.
    pub fn rooms(&self) -> impl Iterator<Item = (&District, &Location, &Room)> {
        self.districts().iter().flat_map(|d| {
            d.locations()
                .iter()
                .flat_map(move |l| l.rooms().iter().map(move |r| (d, l, r)))
        })
    }

    /// Total number of rooms across all districts.
    pub fn room_count(&self) -> usize {
        self.rooms().count()
    }

    /// Total number of locations across all districts.
    pub fn location_count(&self) -> usize {
        self.districts().iter().map(|d| d.locations().len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Region bundles
// ---------------------------------------------------------------------------

/// The `region` header block of a bundle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    /// Region identifier.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Region type tag.
    #[serde(rename = "type", default)]
    pub region_type: String,
    /// Declared number of rooms; `None` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_count: Option<usize>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An exit whose endpoints both live in the declaring bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InternalConnection {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub direction: String,
}

/// An exit that leaves the declaring bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossRegionConnection {
    /// Source room; must exist in the declaring bundle.
    #[serde(default)]
    pub from: String,
    /// Target room in another region.
    #[serde(default)]
    pub to: String,
    /// Region owning `to`.
    #[serde(default)]
    pub target_region: String,
    /// Exit direction, or `"oneway"` for deliberately unidirectional links.
    #[serde(default)]
    pub direction: String,
    /// Stable connection identifier.
    #[serde(default)]
    pub connection_id: String,
}

/// The `connections` section of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connections {
    #[serde(default)]
    pub internal: Vec<InternalConnection>,
    #[serde(default)]
    pub cross_region: Vec<CrossRegionConnection>,
}

/// Provenance block attached to emitted region files.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// RFC 3339 timestamp of the partitioning run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
}

/// One partition unit of the world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionBundle {
    /// Region header; `None` when the section is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionInfo>,
    /// Ordered locations; `None` when the section is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<Location>>,
    /// Connection sets; `None` when the section is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Connections>,
    /// Provenance, present on emitted region files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BundleMetadata>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RegionBundle {
    /// Locations of the bundle, empty when the section is absent.
    pub fn locations(&self) -> &[Location] {
        self.locations.as_deref().unwrap_or(&[])
    }

    /// Iterates every room of the bundle with its location.
    pub fn rooms(&self) -> impl Iterator<Item = (&Location, &Room)> {
        self.locations()
            .iter()
            .flat_map(|l| l.rooms().iter().map(move |r| (l, r)))
    }

    /// Number of rooms actually present.
    pub fn room_count(&self) -> usize {
        self.rooms().count()
    }

    /// Internal connections, empty when the section is absent.
    pub fn internal_connections(&self) -> &[InternalConnection] {
        self.connections
            .as_ref()
            .map(|c| c.internal.as_slice())
            .unwrap_or(&[])
    }

    /// Cross-region connections, empty when the section is absent.
    pub fn cross_region_connections(&self) -> &[CrossRegionConnection] {
        self.connections
            .as_ref()
            .map(|c| c.cross_region.as_slice())
            .unwrap_or(&[])
    }
}

/// Iterates every room of every bundle as `(region_id, location, room)`.
pub fn split_rooms(split: &SplitData) -> impl Iterator<Item = (&str, &Location, &Room)> {
    split.iter().flat_map(|(region_id, bundle)| {
        bundle
            .rooms()
            .map(move |(location, room)| (region_id.as_str(), location, room))
    })
}

/// Iterates every cross-region connection as `(declaring_region, connection)`.
pub fn split_cross_region(
    split: &SplitData,
) -> impl Iterator<Item = (&str, &CrossRegionConnection)> {
    split.iter().flat_map(|(region_id, bundle)| {
        bundle
            .cross_region_connections()
            .iter()
            .map(move |c| (region_id.as_str(), c))
    })
}

// ---------------------------------------------------------------------------
// Critical-connection reference data
// ---------------------------------------------------------------------------

/// A cross-region link that must survive partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalConnectionSpec {
    #[serde(default)]
    pub source_room: String,
    #[serde(default)]
    pub source_room_id: String,
    /// District name of the source room in the pre-partition dataset.
    #[serde(default)]
    pub source_district: String,
    #[serde(default)]
    pub target_room_id: String,
    #[serde(default)]
    pub target_district: String,
    #[serde(default)]
    pub target_room: String,
    /// Expected exit direction, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A room expected to carry at least `connections` cross-region links.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficHub {
    /// Room name (or id) of the hub.
    #[serde(default)]
    pub name: String,
    /// District name of the hub.
    #[serde(default)]
    pub district: String,
    /// Minimum number of cross-region connections.
    #[serde(default)]
    pub connections: usize,
}

/// The critical-connection reference document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalReference {
    #[serde(default)]
    pub total_connections: usize,
    #[serde(default)]
    pub cross_district_connections: usize,
    #[serde(default)]
    pub critical_connections: Vec<CriticalConnectionSpec>,
    #[serde(default)]
    pub traffic_hubs: Vec<TrafficHub>,
    /// District name → region id.
    #[serde(default)]
    pub region_mapping: BTreeMap<String, String>,
}

impl CriticalReference {
    /// Resolves a district name to its region id; unmapped names are
    /// returned unchanged.
    pub fn region_for<'a>(&'a self, district: &'a str) -> &'a str {
        self.region_mapping
            .get(district)
            .map(String::as_str)
            .unwrap_or(district)
    }
}

// ---------------------------------------------------------------------------
// Pipeline input
// ---------------------------------------------------------------------------

/// Both sides of a partitioning run plus the expectations to verify.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestData {
    /// The monolithic pre-partition dataset.
    pub source: SourceDataset,
    /// The per-region bundles.
    pub split: SplitData,
    /// Critical connections and hubs that must survive partitioning.
    pub critical: CriticalReference,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn room_with_missing_fields_deserializes_to_empty_strings() {
        let room: Room = serde_json::from_str(r#"{"id": "r1"}"#).expect("parses");
        assert_eq!(room.id, "r1");
        assert!(room.name.is_empty());
        assert!(room.room_type.is_empty());
        assert!(room.exits.is_empty());
    }

    #[test]
    fn unknown_room_fields_are_preserved() {
        let room: Room =
            serde_json::from_str(r#"{"id": "r1", "name": "Gate", "type": "gate", "npcs": ["guard"]}"#)
                .expect("parses");
        assert!(room.extra.contains_key("npcs"));
        let back = serde_json::to_value(&room).expect("serializes");
        assert_eq!(back["npcs"][0], "guard");
        assert_eq!(back["type"], "gate");
    }

    #[test]
    fn absent_districts_is_distinguishable_from_empty() {
        let absent: SourceDataset = serde_json::from_str("{}").expect("parses");
        let empty: SourceDataset = serde_json::from_str(r#"{"districts": []}"#).expect("parses");
        assert!(absent.districts.is_none());
        assert_eq!(empty.districts.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn bundle_cross_region_fields_use_camel_case() {
        let bundle: RegionBundle = serde_json::from_str(
            r#"{
                "region": {"id": "east", "name": "East", "type": "district", "roomCount": 1},
                "locations": [],
                "connections": {
                    "internal": [],
                    "crossRegion": [
                        {"from": "a", "to": "b", "targetRegion": "west", "direction": "west", "connectionId": "c1"}
                    ]
                }
            }"#,
        )
        .expect("parses");
        let conn = &bundle.cross_region_connections()[0];
        assert_eq!(conn.target_region, "west");
        assert_eq!(conn.connection_id, "c1");
        assert_eq!(bundle.region.as_ref().and_then(|r| r.room_count), Some(1));
    }

    #[test]
    fn source_room_iteration_walks_all_levels() {
        let source: SourceDataset = serde_json::from_str(
            r#"{"districts": [
                {"id": "d1", "name": "North", "locations": [
                    {"id": "l1", "name": "Gate", "rooms": [{"id": "a"}, {"id": "b"}]},
                    {"id": "l2", "name": "Road", "rooms": [{"id": "c"}]}
                ]},
                {"id": "d2", "name": "South", "locations": [
                    {"id": "l3", "name": "Market"}
                ]}
            ]}"#,
        )
        .expect("parses");
        let ids: Vec<&str> = source.rooms().map(|(_, _, r)| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(source.location_count(), 3);
    }

    #[test]
    fn region_for_falls_back_to_district_name() {
        let mut reference = CriticalReference::default();
        reference
            .region_mapping
            .insert("South Gate".to_owned(), "commercial".to_owned());
        assert_eq!(reference.region_for("South Gate"), "commercial");
        assert_eq!(reference.region_for("Outskirts"), "Outskirts");
    }
}
