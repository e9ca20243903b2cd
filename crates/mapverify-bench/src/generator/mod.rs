//! Synthetic world generator.
//!
//! Produces [`SourceDataset`] instances with a region/district/location/room
//! hierarchy, bidirectional exits and cross-region borders, plus the
//! matching [`CriticalReference`] so every suite has something to check.

pub mod reference;
pub mod rooms;
pub mod topology;

use mapverify_core::{
    CriticalReference, DistrictPartitioner, PartitionError, Partitioner as _, SourceDataset,
    TestData,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Configuration for the world generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of regions.
    pub num_regions: usize,
    /// Districts assigned to each region.
    pub districts_per_region: usize,
    /// Locations in each district.
    pub locations_per_district: usize,
    /// Rooms in each location.
    pub rooms_per_location: usize,
    /// Bidirectional links across the border of each pair of regions.
    pub links_per_border: usize,
    /// Fraction of rooms given one extra link inside their region (0.0-0.5).
    pub mesh_density: f64,
    /// Cross-region links promoted to critical connections.
    pub num_critical: usize,
    /// Border rooms listed as traffic hubs.
    pub num_hubs: usize,
}

impl GeneratorConfig {
    /// Total rooms the generated world will hold.
    pub fn room_count(&self) -> usize {
        self.num_regions * self.districts_per_region * self.locations_per_district
            * self.rooms_per_location
    }
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 4 regions, 120 rooms
    Small,
    /// 6 regions, 960 rooms
    Medium,
    /// 8 regions, 3840 rooms
    Large,
    /// 10 regions, 9600 rooms
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_regions: 4,
                districts_per_region: 2,
                locations_per_district: 3,
                rooms_per_location: 5,
                links_per_border: 5,
                mesh_density: 0.1,
                num_critical: 8,
                num_hubs: 2,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_regions: 6,
                districts_per_region: 4,
                locations_per_district: 5,
                rooms_per_location: 8,
                links_per_border: 10,
                mesh_density: 0.15,
                num_critical: 20,
                num_hubs: 4,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_regions: 8,
                districts_per_region: 6,
                locations_per_district: 8,
                rooms_per_location: 10,
                links_per_border: 20,
                mesh_density: 0.15,
                num_critical: 40,
                num_hubs: 8,
            },
            SizeTier::XLarge => GeneratorConfig {
                seed,
                num_regions: 10,
                districts_per_region: 8,
                locations_per_district: 10,
                rooms_per_location: 12,
                links_per_border: 30,
                mesh_density: 0.2,
                num_critical: 60,
                num_hubs: 10,
            },
        }
    }
}

/// A generated world: the source dataset and its reference data.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub source: SourceDataset,
    pub reference: CriticalReference,
}

impl GeneratedWorld {
    /// The partitioner that reproduces the intended regions.
    pub fn partitioner(&self) -> DistrictPartitioner {
        DistrictPartitioner::new(self.reference.region_mapping.clone())
    }

    /// Splits the world and bundles everything the pipeline needs.
    ///
    /// # Errors
    ///
    /// Returns the partitioner's error; generated worlds never trigger one.
    pub fn test_data(&self) -> Result<TestData, PartitionError> {
        let split = self.partitioner().partition(&self.source)?;
        Ok(TestData {
            source: self.source.clone(),
            split,
            critical: self.reference.clone(),
        })
    }
}

/// Generates a world from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_world(config: &GeneratorConfig) -> GeneratedWorld {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let layout = topology::build_world(config, &mut rng);
    let reference = reference::build_reference(&layout, config, &mut rng);
    GeneratedWorld {
        source: layout.into_source(),
        reference,
    }
}
