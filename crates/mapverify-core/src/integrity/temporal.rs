//! Migration-date agreement across bundles.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::{Issue, IssueKind, Subject};
use crate::model::SplitData;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalCheck {
    /// Bundles with a parseable `metadata.migrationDate`.
    pub dated_bundles: usize,
    pub invalid_dates: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    /// False when the dates span more than the allowed skew.
    pub consistent: bool,
}

/// Parses every bundle's migration date and checks that they fall within
/// `max_skew` of each other. Bundles without metadata are ignored.
pub fn check_temporal(split: &SplitData, max_skew: Duration, issues: &mut Vec<Issue>) -> TemporalCheck {
    let mut check = TemporalCheck {
        consistent: true,
        ..TemporalCheck::default()
    };

    for (region, bundle) in split {
        let Some(raw) = bundle
            .metadata
            .as_ref()
            .and_then(|m| m.migration_date.as_deref())
        else {
            continue;
        };
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => {
                let ts = ts.with_timezone(&Utc);
                check.dated_bundles += 1;
                check.earliest = Some(check.earliest.map_or(ts, |e| e.min(ts)));
                check.latest = Some(check.latest.map_or(ts, |l| l.max(ts)));
            }
            Err(e) => {
                check.invalid_dates += 1;
                issues.push(Issue::warning(
                    IssueKind::InvalidDate,
                    Subject::region(region),
                    format!("migrationDate {raw:?} is not RFC 3339: {e}"),
                ));
            }
        }
    }

    if let (Some(earliest), Some(latest)) = (check.earliest, check.latest) {
        let span = latest - earliest;
        if span > max_skew {
            check.consistent = false;
            issues.push(Issue::warning(
                IssueKind::TemporalDrift,
                Subject::Dataset,
                format!(
                    "bundle migration dates span {} minute(s)",
                    span.num_minutes()
                ),
            ));
        }
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BundleMetadata;
    use crate::test_helpers::{bundle, room, split_of};

    fn dated(dates: &[(&str, &str)]) -> SplitData {
        let mut split = split_of(
            dates
                .iter()
                .map(|(region, _)| (*region, bundle(region, vec![room(&format!("{region}1"), &[])])))
                .collect(),
        );
        for (region, date) in dates {
            if let Some(b) = split.get_mut(*region) {
                b.metadata = Some(BundleMetadata {
                    migration_date: Some((*date).to_owned()),
                    ..BundleMetadata::default()
                });
            }
        }
        split
    }

    #[test]
    fn close_dates_are_consistent() {
        let split = dated(&[
            ("a", "2025-01-01T10:00:00Z"),
            ("b", "2025-01-01T10:30:00+00:00"),
        ]);
        let mut issues = Vec::new();
        let check = check_temporal(&split, Duration::hours(1), &mut issues);
        assert!(check.consistent);
        assert_eq!(check.dated_bundles, 2);
        assert!(issues.is_empty());
    }

    #[test]
    fn drift_beyond_skew_is_reported() {
        let split = dated(&[("a", "2025-01-01T10:00:00Z"), ("b", "2025-01-01T12:00:00Z")]);
        let mut issues = Vec::new();
        let check = check_temporal(&split, Duration::hours(1), &mut issues);
        assert!(!check.consistent);
        assert_eq!(issues[0].kind, IssueKind::TemporalDrift);
    }

    #[test]
    fn unparsable_date_is_a_warning() {
        let split = dated(&[("a", "yesterday")]);
        let mut issues = Vec::new();
        let check = check_temporal(&split, Duration::hours(1), &mut issues);
        assert_eq!(check.invalid_dates, 1);
        assert!(check.consistent);
        assert_eq!(issues[0].kind, IssueKind::InvalidDate);
    }
}
