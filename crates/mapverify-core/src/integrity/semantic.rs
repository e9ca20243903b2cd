//! Field-by-field comparison of rooms present on both sides.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grade::{clamp_score, percent};
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{Room, SourceDataset, SplitData, split_rooms};

/// One differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMismatch {
    pub room_id: String,
    /// `name`, `type` or `coordinates`.
    pub field: String,
    pub source: String,
    pub split: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticCheck {
    /// Rooms present on both sides.
    pub compared: usize,
    /// Compared rooms with no mismatching field.
    pub accurate: usize,
    pub mismatches: Vec<FieldMismatch>,
    /// accurate / source rooms.
    pub accuracy_rate: f64,
    /// 100 − mismatches / compared ×100.
    pub consistency_rate: f64,
}

/// Compares name, type and (when both sides carry them) coordinates.
///
/// Coordinates match when each axis differs by at most `tolerance`. The first
/// bundle occurrence of a room is the one compared.
pub fn check_semantics(
    source: &SourceDataset,
    split: &SplitData,
    tolerance: f64,
    issues: &mut Vec<Issue>,
) -> SemanticCheck {
    let mut by_id: HashMap<&str, &Room> = HashMap::new();
    for (_, _, room) in split_rooms(split) {
        by_id.entry(room.id.as_str()).or_insert(room);
    }

    let mut check = SemanticCheck::default();
    let mut source_rooms = 0usize;
    for (_, _, src) in source.rooms() {
        source_rooms += 1;
        let Some(dst) = by_id.get(src.id.as_str()) else {
            continue;
        };
        check.compared += 1;
        let before = check.mismatches.len();

        if src.name != dst.name {
            check.mismatches.push(mismatch(&src.id, "name", &src.name, &dst.name));
        }
        if src.room_type != dst.room_type {
            check
                .mismatches
                .push(mismatch(&src.id, "type", &src.room_type, &dst.room_type));
        }
        if let (Some(a), Some(b)) = (src.coordinates, dst.coordinates) {
            if (a.x - b.x).abs() > tolerance || (a.y - b.y).abs() > tolerance {
                check.mismatches.push(mismatch(
                    &src.id,
                    "coordinates",
                    &format!("({}, {})", a.x, a.y),
                    &format!("({}, {})", b.x, b.y),
                ));
            }
        }

        if check.mismatches.len() == before {
            check.accurate += 1;
        }
    }

    for m in &check.mismatches {
        issues.push(Issue::warning(
            IssueKind::FieldMismatch,
            Subject::room(&m.room_id),
            format!("{} differs: source {:?}, split {:?}", m.field, m.source, m.split),
        ));
    }

    check.accuracy_rate = percent(check.accurate, source_rooms);
    check.consistency_rate = if check.compared == 0 {
        100.0
    } else {
        clamp_score(100.0 - check.mismatches.len() as f64 / check.compared as f64 * 100.0)
    };
    check
}

fn mismatch(room_id: &str, field: &str, source: &str, split: &str) -> FieldMismatch {
    FieldMismatch {
        room_id: room_id.to_owned(),
        field: field.to_owned(),
        source: source.to_owned(),
        split: split.to_owned(),
    }
}
