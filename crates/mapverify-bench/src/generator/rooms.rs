//! Names, type tags and positions for generated rooms.
use mapverify_core::model::{Coordinates, Room};
use rand::Rng;
use rand::rngs::StdRng;

const ADJECTIVES: &[&str] = &[
    "Amber", "Broken", "Copper", "Dusty", "Emerald", "Foggy", "Gilded", "Hollow", "Iron",
    "Jade", "Lantern", "Mossy", "Narrow", "Old", "Quiet", "Rusty", "Salt", "Tall",
];

const PLACES: &[&str] = &[
    "Alley", "Arcade", "Bridge", "Court", "Gate", "Hall", "Lane", "Market", "Pier", "Plaza",
    "Row", "Square", "Stair", "Yard",
];

const DISTRICT_KINDS: &[&str] = &["Quarter", "Ward", "Heights", "Docks", "Commons", "Reach"];

/// Room type tags with their relative weights.
const ROOM_TYPES: &[(&str, u32)] = &[
    ("street", 40),
    ("shop", 15),
    ("tavern", 8),
    ("residence", 20),
    ("temple", 4),
    ("warehouse", 8),
    ("plaza", 5),
];

/// Display name of the district with global index `index`.
///
/// Names are unique per index; region mappings are keyed by them.
pub fn district_name(index: usize) -> String {
    let adjective = ADJECTIVES[index % ADJECTIVES.len()];
    let kind = DISTRICT_KINDS[(index / ADJECTIVES.len()) % DISTRICT_KINDS.len()];
    format!("{adjective} {kind} {index}")
}

/// Display name of a location.
pub fn location_name(rng: &mut StdRng) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let place = PLACES[rng.gen_range(0..PLACES.len())];
    format!("The {adjective} {place}")
}

fn room_type(rng: &mut StdRng) -> &'static str {
    let total: u32 = ROOM_TYPES.iter().map(|(_, w)| w).sum();
    let mut pick = rng.gen_range(0..total);
    for &(tag, weight) in ROOM_TYPES {
        if pick < weight {
            return tag;
        }
        pick -= weight;
    }
    "street"
}

/// Builds an exit-less room at grid position `(column, row)`.
pub fn room(rng: &mut StdRng, id: String, column: usize, row: usize) -> Room {
    let room_type = room_type(rng);
    let place = PLACES[rng.gen_range(0..PLACES.len())];
    let name = format!("{} {place}", ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())]);
    let description = rng
        .gen_bool(0.3)
        .then(|| format!("A {room_type} near the {}.", place.to_lowercase()));
    Room {
        id,
        name,
        room_type: room_type.to_owned(),
        description,
        coordinates: Some(Coordinates {
            x: column as f64 * 10.0 + rng.gen_range(0.0..5.0),
            y: row as f64 * 10.0 + rng.gen_range(0.0..5.0),
        }),
        ..Room::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;

    #[test]
    fn district_names_are_unique() {
        let names: HashSet<String> = (0..500).map(district_name).collect();
        assert_eq!(names.len(), 500);
    }

    #[test]
    fn rooms_carry_every_required_field() {
        let mut rng = StdRng::seed_from_u64(3);
        for i in 0..50 {
            let r = room(&mut rng, format!("room_{i}"), i, 0);
            assert!(!r.name.is_empty());
            assert!(!r.room_type.is_empty());
            assert!(r.coordinates.is_some());
            assert!(r.exits.is_empty());
        }
    }
}
