//! Required-field compliance and basic id/name quality rules.
use serde::{Deserialize, Serialize};

use crate::grade::clamp_score;
use crate::issue::{Issue, IssueKind, Subject};
use crate::model::{SplitData, split_rooms};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCheck {
    /// Region, location, room and connection records inspected.
    pub records_checked: usize,
    pub format_errors: usize,
    /// 100 − format errors / records ×100.
    pub validity_rate: f64,
}

/// Checks that every record carries its required fields.
///
/// Required: region `id`/`name`/`type`/`roomCount`; location
/// `id`/`name`/`rooms`; room `id`/`name`/`type`; connection `from`/`to`.
pub fn check_format(split: &SplitData, issues: &mut Vec<Issue>) -> FormatCheck {
    let mut records = 0usize;
    let mut errors = 0usize;
    let mut missing = |subject: Subject, entity: &str, field: &str| {
        errors += 1;
        issues.push(Issue::error(
            IssueKind::MissingField,
            subject,
            format!("{entity} record is missing required field {field:?}"),
        ));
    };

    for (region_id, bundle) in split {
        if let Some(info) = &bundle.region {
            records += 1;
            let subject = || Subject::region(region_id);
            if info.id.is_empty() {
                missing(subject(), "region", "id");
            }
            if info.name.is_empty() {
                missing(subject(), "region", "name");
            }
            if info.region_type.is_empty() {
                missing(subject(), "region", "type");
            }
            if info.room_count.is_none() {
                missing(subject(), "region", "roomCount");
            }
        }

        for location in bundle.locations() {
            records += 1;
            let subject = || Subject::Location {
                id: location.id.clone(),
            };
            if location.id.is_empty() {
                missing(subject(), "location", "id");
            }
            if location.name.is_empty() {
                missing(subject(), "location", "name");
            }
            if location.rooms.is_none() {
                missing(subject(), "location", "rooms");
            }
            for room in location.rooms() {
                records += 1;
                let subject = || Subject::room(&room.id);
                if room.id.is_empty() {
                    missing(subject(), "room", "id");
                }
                if room.name.is_empty() {
                    missing(subject(), "room", "name");
                }
                if room.room_type.is_empty() {
                    missing(subject(), "room", "type");
                }
            }
        }

        let endpoints = bundle
            .internal_connections()
            .iter()
            .map(|c| (&c.from, &c.to))
            .chain(
                bundle
                    .cross_region_connections()
                    .iter()
                    .map(|c| (&c.from, &c.to)),
            );
        for (from, to) in endpoints {
            records += 1;
            if from.is_empty() {
                missing(Subject::connection(from, to), "connection", "from");
            }
            if to.is_empty() {
                missing(Subject::connection(from, to), "connection", "to");
            }
        }
    }

    FormatCheck {
        records_checked: records,
        format_errors: errors,
        validity_rate: if records == 0 {
            100.0
        } else {
            clamp_score(100.0 - errors as f64 / records as f64 * 100.0)
        },
    }
}

/// Flags blank ids, blank names and names longer than `max_name_len`
/// characters. Returns the number of findings.
pub fn check_quality(split: &SplitData, max_name_len: usize, issues: &mut Vec<Issue>) -> usize {
    let mut count = 0usize;
    for (region, _, room) in split_rooms(split) {
        let mut flag = |message: String| {
            count += 1;
            issues.push(Issue::warning(
                IssueKind::QualityIssue,
                Subject::room(&room.id),
                message,
            ));
        };
        if room.id.trim().is_empty() {
            flag(format!("room in region {region} has a blank id"));
        }
        if room.name.trim().is_empty() {
            flag("room has a blank name".to_owned());
        }
        let len = room.name.chars().count();
        if len > max_name_len {
            flag(format!("room name is {len} characters long"));
        }
    }
    count
}
