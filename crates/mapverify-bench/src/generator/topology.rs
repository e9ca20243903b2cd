//! World layout: the room hierarchy, intra-region chains, borders between
//! every pair of regions, and an optional mesh overlay.
//!
//! Every link is symmetric, so generated worlds are connected, have no
//! dangling exits, and every cross-region connection has a reverse.

use mapverify_core::model::{District, Location, Room, SourceDataset};
use rand::Rng;
use rand::rngs::StdRng;
use serde_json::json;

use super::GeneratorConfig;
use super::rooms;

/// Compass directions in opposite pairs.
const DIRECTIONS: &[(&str, &str)] = &[
    ("north", "south"),
    ("east", "west"),
    ("northeast", "southwest"),
    ("northwest", "southeast"),
    ("up", "down"),
];

/// Where a room sits in the hierarchy. All indices are global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSlot {
    pub region: usize,
    pub district: usize,
    pub location: usize,
}

/// A district before assembly.
#[derive(Debug, Clone)]
pub struct DistrictPlan {
    pub id: String,
    pub name: String,
    pub region: usize,
}

/// A generated world in flat form: rooms are stored in hierarchy order and
/// linked by index.
#[derive(Debug, Clone, Default)]
pub struct WorldLayout {
    pub region_ids: Vec<String>,
    pub districts: Vec<DistrictPlan>,
    /// `(id, name, district)` per location.
    pub locations: Vec<(String, String, usize)>,
    pub rooms: Vec<Room>,
    pub slots: Vec<RoomSlot>,
    /// Room index pairs linked across a region border.
    pub cross_links: Vec<(usize, usize)>,
}

impl WorldLayout {
    /// Assembles the nested source document.
    pub fn into_source(self) -> SourceDataset {
        let mut districts: Vec<District> = self
            .districts
            .iter()
            .map(|plan| District {
                id: plan.id.clone(),
                name: plan.name.clone(),
                locations: Some(Vec::new()),
                ..District::default()
            })
            .collect();
        let mut locations: Vec<Location> = self
            .locations
            .iter()
            .map(|(id, name, _)| Location {
                id: id.clone(),
                name: name.clone(),
                rooms: Some(Vec::new()),
                ..Location::default()
            })
            .collect();

        for (room, slot) in self.rooms.into_iter().zip(&self.slots) {
            if let Some(rooms) = locations[slot.location].rooms.as_mut() {
                rooms.push(room);
            }
        }
        for (location, (_, _, district)) in locations.into_iter().zip(&self.locations) {
            if let Some(list) = districts[*district].locations.as_mut() {
                list.push(location);
            }
        }

        SourceDataset {
            city: Some(json!({
                "name": "Generated City",
                "regions": self.region_ids.len(),
            })),
            districts: Some(districts),
            ..SourceDataset::default()
        }
    }

    /// Total number of exits across all rooms.
    pub fn exit_count(&self) -> usize {
        self.rooms.iter().map(|r| r.exits.len()).sum()
    }
}

/// Adds a symmetric exit pair between rooms `a` and `b`.
///
/// Picks the first compass pair free on both sides, falling back to
/// numbered `passage_{k}` exits. Returns `false` when the rooms are the
/// same or already linked.
pub fn link(rooms: &mut [Room], a: usize, b: usize) -> bool {
    if a == b {
        return false;
    }
    let b_id = rooms[b].id.clone();
    let a_id = rooms[a].id.clone();
    if rooms[a].exits.values().any(|t| *t == b_id) {
        return false;
    }

    let free = |room: &Room, dir: &str| !room.exits.contains_key(dir);
    let compass = DIRECTIONS.iter().find_map(|&(d, back)| {
        if free(&rooms[a], d) && free(&rooms[b], back) {
            Some((d.to_owned(), back.to_owned()))
        } else if free(&rooms[a], back) && free(&rooms[b], d) {
            Some((back.to_owned(), d.to_owned()))
        } else {
            None
        }
    });
    let (forward, backward) = compass.unwrap_or_else(|| {
        let k = (0usize..)
            .find(|k| {
                let name = format!("passage_{k}");
                free(&rooms[a], &name) && free(&rooms[b], &name)
            })
            .unwrap_or_default();
        (format!("passage_{k}"), format!("passage_{k}"))
    });

    rooms[a].exits.insert(forward, b_id);
    rooms[b].exits.insert(backward, a_id);
    true
}

/// Builds the flat world layout for `config`.
pub fn build_world(config: &GeneratorConfig, rng: &mut StdRng) -> WorldLayout {
    let mut layout = WorldLayout::default();
    // First room index of every region.
    let mut region_starts = Vec::with_capacity(config.num_regions);

    for r in 0..config.num_regions {
        layout.region_ids.push(format!("region_{r:02}"));
        region_starts.push(layout.rooms.len());
        let mut previous_district_head: Option<usize> = None;

        for _ in 0..config.districts_per_region {
            let d = layout.districts.len();
            layout.districts.push(DistrictPlan {
                id: format!("district_{d:03}"),
                name: rooms::district_name(d),
                region: r,
            });
            let district_head = layout.rooms.len();
            let mut previous_location_tail: Option<usize> = None;

            for l in 0..config.locations_per_district {
                let loc = layout.locations.len();
                layout
                    .locations
                    .push((format!("loc_{d:03}_{l:02}"), rooms::location_name(rng), d));
                let location_head = layout.rooms.len();

                for k in 0..config.rooms_per_location {
                    let index = layout.rooms.len();
                    let room = rooms::room(rng, format!("room_{index:05}"), r * 10 + l, d * 10 + k);
                    layout.rooms.push(room);
                    layout.slots.push(RoomSlot {
                        region: r,
                        district: d,
                        location: loc,
                    });
                    if k > 0 {
                        link(&mut layout.rooms, index - 1, index);
                    }
                }

                if layout.rooms.len() > location_head {
                    if let Some(tail) = previous_location_tail {
                        link(&mut layout.rooms, tail, location_head);
                    }
                    previous_location_tail = Some(layout.rooms.len() - 1);
                }
            }

            if layout.rooms.len() > district_head {
                if let Some(head) = previous_district_head {
                    link(&mut layout.rooms, head, district_head);
                }
                previous_district_head = Some(district_head);
            }
        }
    }
    region_starts.push(layout.rooms.len());

    let region_range = |r: usize| region_starts[r]..region_starts[r + 1];

    // Every pair of regions shares a border.
    for r in 0..config.num_regions {
        for other in r + 1..config.num_regions {
            let (here, there) = (region_range(r), region_range(other));
            if here.is_empty() || there.is_empty() {
                continue;
            }
            for _ in 0..config.links_per_border.max(1) {
                let a = rng.gen_range(here.clone());
                let b = rng.gen_range(there.clone());
                if link(&mut layout.rooms, a, b) {
                    layout.cross_links.push((a, b));
                }
            }
        }
    }

    let extra = (layout.rooms.len() as f64 * config.mesh_density.clamp(0.0, 0.5)).round() as usize;
    for _ in 0..extra {
        let a = rng.gen_range(0..layout.rooms.len());
        let range = region_range(layout.slots[a].region);
        let b = rng.gen_range(range);
        link(&mut layout.rooms, a, b);
    }

    layout
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::generator::SizeTier;

    fn bare(id: &str) -> Room {
        Room {
            id: id.to_owned(),
            ..Room::default()
        }
    }

    #[test]
    fn link_is_symmetric() {
        let mut rooms = vec![bare("a"), bare("b")];
        assert!(link(&mut rooms, 0, 1));
        assert_eq!(rooms[0].exits.get("north").map(String::as_str), Some("b"));
        assert_eq!(rooms[1].exits.get("south").map(String::as_str), Some("a"));
    }

    #[test]
    fn link_refuses_self_and_duplicates() {
        let mut rooms = vec![bare("a"), bare("b")];
        assert!(!link(&mut rooms, 0, 0));
        assert!(link(&mut rooms, 0, 1));
        assert!(!link(&mut rooms, 0, 1));
        assert_eq!(rooms[0].exits.len(), 1);
    }

    #[test]
    fn link_falls_back_to_passages() {
        let mut rooms: Vec<Room> = (0..12).map(|i| bare(&format!("r{i}"))).collect();
        for b in 1..12 {
            assert!(link(&mut rooms, 0, b));
        }
        assert_eq!(rooms[0].exits.len(), 11);
        assert!(rooms[0].exits.keys().any(|k| k.starts_with("passage_")));
    }

    #[test]
    fn small_world_has_expected_shape() {
        let config = SizeTier::Small.config(1);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let layout = build_world(&config, &mut rng);
        assert_eq!(layout.rooms.len(), config.room_count());
        assert_eq!(layout.region_ids.len(), 4);
        assert_eq!(layout.districts.len(), 8);
        assert!(!layout.cross_links.is_empty());
        assert_eq!(layout.exit_count() % 2, 0);
    }

    #[test]
    fn single_region_has_no_cross_links() {
        let config = GeneratorConfig {
            num_regions: 1,
            ..SizeTier::Small.config(2)
        };
        let mut rng = StdRng::seed_from_u64(config.seed);
        let layout = build_world(&config, &mut rng);
        assert!(layout.cross_links.is_empty());
    }
}
