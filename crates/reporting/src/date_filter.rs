//! Inclusive date-range filtering over any dated record.

use campaign_core::types::{CampaignRow, DateInterval, SeriesPoint};
use chrono::{DateTime, NaiveDate};
use std::borrow::Cow;
use tracing::debug;

/// Records that carry an optional ISO-8601 date.
pub trait Dated {
    fn date(&self) -> Option<&str>;
}

impl Dated for CampaignRow {
    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Dated for SeriesPoint {
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// Parses `YYYY-MM-DD`, falling back to the date part of an RFC 3339 timestamp.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Keeps the records whose date falls inside `interval`, both ends inclusive.
///
/// Without an interval, or with either bound unset, the input is handed back
/// borrowed. Records without a parseable date never match an active interval.
pub fn filter_by_date_range<'a, T>(records: &'a [T], interval: Option<&DateInterval>) -> Cow<'a, [T]>
where
    T: Dated + Clone,
{
    let Some((from, to)) = interval.and_then(DateInterval::bounds) else {
        return Cow::Borrowed(records);
    };

    let kept: Vec<T> = records
        .iter()
        .filter(|record| {
            record
                .date()
                .and_then(parse_record_date)
                .is_some_and(|date| from <= date && date <= to)
        })
        .cloned()
        .collect();

    debug!(
        total = records.len(),
        kept = kept.len(),
        %from,
        %to,
        "Applied date range filter"
    );
    Cow::Owned(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn point(name: &str, d: Option<&str>) -> SeriesPoint {
        SeriesPoint {
            name: name.to_string(),
            value: 1.0,
            date: d.map(str::to_string),
            revenue: None,
            users: None,
            conversions: None,
        }
    }

    fn sample() -> Vec<SeriesPoint> {
        vec![
            point("a", Some("2026-03-01")),
            point("b", Some("2026-03-15")),
            point("c", Some("2026-03-31")),
            point("d", Some("2026-04-01")),
            point("e", None),
            point("f", Some("not-a-date")),
            point("g", Some("2026-03-20T10:30:00Z")),
        ]
    }

    #[test]
    fn test_no_interval_is_identity() {
        let records = sample();
        let out = filter_by_date_range(&records, None);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), records.as_slice());
    }

    #[test]
    fn test_half_open_interval_is_identity() {
        let records = sample();
        let interval = DateInterval {
            from: None,
            to: Some(date("2026-03-10")),
        };
        let out = filter_by_date_range(&records, Some(&interval));
        assert_eq!(out.len(), records.len());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let records = sample();
        let interval = DateInterval::new(date("2026-03-01"), date("2026-03-31"));
        let out = filter_by_date_range(&records, Some(&interval));
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "g"]);
    }

    #[test]
    fn test_missing_and_malformed_dates_fail_closed() {
        let records = sample();
        let interval = DateInterval::new(date("2000-01-01"), date("2100-01-01"));
        let out = filter_by_date_range(&records, Some(&interval));
        assert!(out.iter().all(|p| p.name != "e" && p.name != "f"));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_every_excluded_record_is_out_of_bounds_or_undated() {
        let records = sample();
        let interval = DateInterval::new(date("2026-03-10"), date("2026-03-25"));
        let out = filter_by_date_range(&records, Some(&interval));
        for p in out.iter() {
            let d = p.date().and_then(parse_record_date).unwrap();
            assert!(interval.contains(d));
        }
        for p in records.iter().filter(|p| !out.contains(p)) {
            if let Some(d) = p.date().and_then(parse_record_date) {
                assert!(!interval.contains(d));
            }
        }
    }

    #[test]
    fn test_inverted_interval_matches_nothing() {
        let records = sample();
        let interval = DateInterval::new(date("2026-03-31"), date("2026-03-01"));
        assert!(filter_by_date_range(&records, Some(&interval)).is_empty());
    }

    #[test]
    fn test_input_not_mutated() {
        let records = sample();
        let before = records.clone();
        let interval = DateInterval::new(date("2026-03-01"), date("2026-03-02"));
        let _ = filter_by_date_range(&records, Some(&interval));
        assert_eq!(records, before);
    }
}
