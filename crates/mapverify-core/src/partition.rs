//! Splitting a source dataset into region bundles.
//!
//! Verification only needs the [`Partitioner`] seam; [`DistrictPartitioner`]
//! is a straightforward implementation that assigns whole districts to
//! regions so the verifier can run end to end without an external splitter.
use std::collections::{BTreeMap, HashMap};

use crate::error::PartitionError;
use crate::model::{
    Connections, CrossRegionConnection, InternalConnection, RegionBundle, RegionInfo,
    SourceDataset, SplitData,
};

/// Produces region bundles from a source dataset.
pub trait Partitioner {
    /// Splits `source` into bundles keyed by region id.
    fn partition(&self, source: &SourceDataset) -> Result<SplitData, PartitionError>;
}

/// Assigns every district to exactly one region.
///
/// The region of a district is, in order of precedence: its own `region`
/// field, the entry for its name (or id) in the mapping, or its id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistrictPartitioner {
    mapping: BTreeMap<String, String>,
}

impl DistrictPartitioner {
    /// Creates a partitioner that maps district names to region ids.
    pub fn new(mapping: BTreeMap<String, String>) -> Self {
        Self { mapping }
    }

    fn region_of<'a>(&'a self, id: &'a str, name: &'a str, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or_else(|| self.mapping.get(name).map(String::as_str))
            .or_else(|| self.mapping.get(id).map(String::as_str))
            .unwrap_or(id)
    }
}

impl Partitioner for DistrictPartitioner {
    fn partition(&self, source: &SourceDataset) -> Result<SplitData, PartitionError> {
        let districts = source
            .districts
            .as_deref()
            .ok_or_else(|| PartitionError::new("source dataset has no districts list"))?;

        let mut split = SplitData::new();
        for district in districts {
            let region = self.region_of(&district.id, &district.name, district.region.as_deref());
            if region.is_empty() {
                return Err(PartitionError::new(format!(
                    "district {:?} has no id and no region mapping",
                    district.name
                )));
            }
            let bundle = split.entry(region.to_owned()).or_insert_with(|| RegionBundle {
                region: Some(RegionInfo {
                    id: region.to_owned(),
                    name: if district.name.is_empty() {
                        region.to_owned()
                    } else {
                        district.name.clone()
                    },
                    region_type: "district".to_owned(),
                    ..RegionInfo::default()
                }),
                locations: Some(Vec::new()),
                connections: Some(Connections::default()),
                ..RegionBundle::default()
            });
            if let Some(locations) = bundle.locations.as_mut() {
                locations.extend(district.locations().iter().cloned());
            }
        }

        // First region to claim a room id owns it.
        let mut owner: HashMap<String, String> = HashMap::new();
        for (region, bundle) in &split {
            for (_, room) in bundle.rooms() {
                owner
                    .entry(room.id.clone())
                    .or_insert_with(|| region.clone());
            }
        }

        for (region, bundle) in split.iter_mut() {
            let mut connections = Connections::default();
            for (_, room) in bundle.rooms() {
                for (direction, target) in &room.exits {
                    match owner.get(target) {
                        Some(target_region) if target_region == region => {
                            connections.internal.push(InternalConnection {
                                from: room.id.clone(),
                                to: target.clone(),
                                direction: direction.clone(),
                            });
                        }
                        Some(target_region) => {
                            connections.cross_region.push(CrossRegionConnection {
                                from: room.id.clone(),
                                to: target.clone(),
                                target_region: target_region.clone(),
                                direction: direction.clone(),
                                connection_id: format!("{}_{}", room.id, target),
                            });
                        }
                        None => {
                            tracing::debug!(room = %room.id, %target, "exit target not in any region");
                        }
                    }
                }
            }
            let room_count = bundle.room_count();
            if let Some(info) = bundle.region.as_mut() {
                info.room_count = Some(room_count);
            }
            bundle.connections = Some(connections);
        }

        tracing::debug!(
            regions = split.len(),
            rooms = owner.len(),
            "partitioned source dataset"
        );
        Ok(split)
    }
}
