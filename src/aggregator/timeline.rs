use super::{ms_to_minutes, summarize};
use crate::constants::OTHER_SERIES;
use crate::error::AppError;
use crate::models::{Timeline, TimelinePoint, UsageRecord};
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;

const NANOS_PER_MS: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

struct Bucket<'a> {
    start: DateTime<FixedOffset>,
    totals_ms: IndexMap<&'a str, u64>,
}

/// Start of the bucket holding `ts`, counted from midnight of its own day
fn bucket_start(ts: DateTime<FixedOffset>, bucket_size_ms: i64) -> DateTime<FixedOffset> {
    let time = ts.time();
    let nanos_of_day = i64::from(time.num_seconds_from_midnight()) * NANOS_PER_SEC
        + i64::from(time.nanosecond());
    let into_bucket = nanos_of_day.rem_euclid(bucket_size_ms.saturating_mul(NANOS_PER_MS));
    ts - TimeDelta::nanoseconds(into_bucket)
}

/// Series shown in the timeline, in display order
fn series_keys(records: &[UsageRecord], tracked_apps: &[String]) -> Vec<String> {
    if tracked_apps.is_empty() {
        return summarize(records).into_iter().map(|row| row.app).collect();
    }

    let mut keys: IndexSet<String> = tracked_apps
        .iter()
        .filter(|app| records.iter().any(|r| &r.app == *app))
        .cloned()
        .collect();
    if records.iter().any(|r| !tracked_apps.contains(&r.app)) {
        keys.insert(OTHER_SERIES.to_string());
    }
    keys.into_iter().collect()
}

fn point(start: DateTime<FixedOffset>, totals_ms: &IndexMap<&str, u64>, keys: &[String]) -> TimelinePoint {
    let values = keys
        .iter()
        .map(|key| {
            let ms = totals_ms.get(key.as_str()).copied().unwrap_or(0);
            (key.clone(), ms_to_minutes(ms))
        })
        .collect();
    TimelinePoint {
        bucket_start: start,
        values,
    }
}

/// Stack usage into fixed-width time buckets.
///
/// Records of apps in `tracked_apps` get their own series, everything else
/// lands in "Other". With no tracked apps every app gets a series, ranked by
/// total time, and there is no "Other". Buckets between the first and last
/// occupied one are emitted with zeros so the time axis has no holes.
pub fn bucket_timeline(
    records: &[UsageRecord],
    tracked_apps: &[String],
    bucket_size_ms: i64,
) -> Result<Timeline, AppError> {
    if bucket_size_ms <= 0 {
        return Err(AppError::InvalidInput {
            field: "bucket_size_ms",
            reason: "must be positive".into(),
        });
    }

    let keys = series_keys(records, tracked_apps);

    let mut buckets: BTreeMap<i64, Bucket<'_>> = BTreeMap::new();
    for record in records {
        let start = bucket_start(record.timestamp, bucket_size_ms);
        let series = if tracked_apps.is_empty() || tracked_apps.contains(&record.app) {
            record.app.as_str()
        } else {
            OTHER_SERIES
        };

        let bucket = buckets
            .entry(start.timestamp_millis())
            .or_insert_with(|| Bucket {
                start,
                totals_ms: IndexMap::new(),
            });
        let total = bucket.totals_ms.entry(series).or_insert(0);
        *total = total.saturating_add(record.duration_ms);
    }

    let step = TimeDelta::milliseconds(bucket_size_ms);
    let empty = IndexMap::new();
    let mut points = Vec::with_capacity(buckets.len());
    let mut occupied = buckets.into_values().peekable();

    while let Some(bucket) = occupied.next() {
        points.push(point(bucket.start, &bucket.totals_ms, &keys));

        let Some(next_ms) = occupied.peek().map(|next| next.start.timestamp_millis()) else {
            break;
        };
        let mut gap = bucket.start + step;
        while gap.timestamp_millis() < next_ms {
            points.push(point(gap, &empty, &keys));
            gap += step;
        }
    }

    Ok(Timeline { points, keys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TIMELINE_BUCKET_MS;
    use crate::test_utils::{at, record};
    use chrono::TimeZone;

    fn tracked(apps: &[&str]) -> Vec<String> {
        apps.iter().map(|a| a.to_string()).collect()
    }

    fn hhmm(point: &TimelinePoint) -> String {
        point.bucket_start.format("%H:%M").to_string()
    }

    #[test]
    fn test_buckets_floor_to_half_hours() {
        let ts = at(2024, 3, 5, 9, 59) + TimeDelta::seconds(59) + TimeDelta::milliseconds(999);
        assert_eq!(bucket_start(ts, TIMELINE_BUCKET_MS), at(2024, 3, 5, 9, 30));
        assert_eq!(bucket_start(at(2024, 3, 5, 9, 10), TIMELINE_BUCKET_MS), at(2024, 3, 5, 9, 0));
        assert_eq!(bucket_start(at(2024, 3, 5, 9, 30), TIMELINE_BUCKET_MS), at(2024, 3, 5, 9, 30));
    }

    #[test]
    fn test_bucket_start_zeroes_sub_millisecond_part() {
        let ts = at(2024, 3, 5, 9, 44) + TimeDelta::nanoseconds(123_456_789);
        let start = bucket_start(ts, TIMELINE_BUCKET_MS);
        assert_eq!(start.nanosecond(), 0);
        assert_eq!(start, at(2024, 3, 5, 9, 30));
    }

    #[test]
    fn test_bucket_start_uses_record_offset() {
        let offset = FixedOffset::east_opt(5 * 3600 + 45 * 60).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 3, 5, 14, 50, 0).unwrap();
        let start = bucket_start(ts, TIMELINE_BUCKET_MS);
        assert_eq!(start.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn test_gaps_are_zero_filled() {
        let records = vec![
            record("Editor", 600_000, at(2024, 3, 5, 9, 10)),
            record("Editor", 300_000, at(2024, 3, 5, 11, 5)),
        ];

        let timeline = bucket_timeline(&records, &[], TIMELINE_BUCKET_MS).unwrap();

        let labels: Vec<String> = timeline.points.iter().map(hhmm).collect();
        assert_eq!(labels, ["09:00", "09:30", "10:00", "10:30", "11:00"]);
        assert!((timeline.points[0].values["Editor"] - 10.0).abs() < f64::EPSILON);
        assert!(timeline.points[2].values["Editor"].abs() < f64::EPSILON);
        assert!((timeline.points[4].values["Editor"] - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_every_point_has_every_key() {
        let records = vec![
            record("Editor", 60_000, at(2024, 3, 5, 9, 0)),
            record("Browser", 60_000, at(2024, 3, 5, 10, 0)),
            record("Chat", 60_000, at(2024, 3, 5, 12, 0)),
        ];

        let timeline = bucket_timeline(&records, &tracked(&["Browser"]), TIMELINE_BUCKET_MS).unwrap();

        assert_eq!(timeline.keys, ["Browser", "Other"]);
        assert_eq!(timeline.points.len(), 7);
        for point in &timeline.points {
            let keys: Vec<&String> = point.values.keys().collect();
            assert_eq!(keys, timeline.keys.iter().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_untracked_apps_fold_into_other() {
        let records = vec![
            record("Editor", 120_000, at(2024, 3, 5, 9, 5)),
            record("Browser", 60_000, at(2024, 3, 5, 9, 10)),
            record("Chat", 180_000, at(2024, 3, 5, 9, 20)),
        ];

        let timeline = bucket_timeline(&records, &tracked(&["Editor"]), TIMELINE_BUCKET_MS).unwrap();

        assert_eq!(timeline.points.len(), 1);
        let values = &timeline.points[0].values;
        assert!((values["Editor"] - 2.0).abs() < f64::EPSILON);
        assert!((values[OTHER_SERIES] - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_other_series_when_everything_is_tracked() {
        let records = vec![
            record("Editor", 60_000, at(2024, 3, 5, 9, 5)),
            record("Browser", 60_000, at(2024, 3, 5, 9, 10)),
        ];

        let timeline =
            bucket_timeline(&records, &tracked(&["Browser", "Editor", "Absent"]), TIMELINE_BUCKET_MS).unwrap();

        assert_eq!(timeline.keys, ["Browser", "Editor"]);
    }

    #[test]
    fn test_untracked_keys_are_ranked_by_total() {
        let records = vec![
            record("Editor", 60_000, at(2024, 3, 5, 9, 5)),
            record("Browser", 300_000, at(2024, 3, 5, 9, 10)),
            record("Chat", 120_000, at(2024, 3, 5, 10, 10)),
        ];

        let timeline = bucket_timeline(&records, &[], TIMELINE_BUCKET_MS).unwrap();

        assert_eq!(timeline.keys, ["Browser", "Chat", "Editor"]);
        assert!(!timeline.keys.iter().any(|k| k == OTHER_SERIES));
    }

    #[test]
    fn test_unsorted_input_produces_ordered_axis() {
        let records = vec![
            record("Editor", 60_000, at(2024, 3, 5, 10, 40)),
            record("Editor", 60_000, at(2024, 3, 5, 9, 40)),
        ];

        let timeline = bucket_timeline(&records, &[], TIMELINE_BUCKET_MS).unwrap();

        let labels: Vec<String> = timeline.points.iter().map(hhmm).collect();
        assert_eq!(labels, ["09:30", "10:00", "10:30"]);
    }

    #[test]
    fn test_axis_spans_midnight() {
        let records = vec![
            record("Editor", 60_000, at(2024, 3, 5, 23, 40)),
            record("Editor", 60_000, at(2024, 3, 6, 0, 20)),
        ];

        let timeline = bucket_timeline(&records, &[], TIMELINE_BUCKET_MS).unwrap();

        let labels: Vec<String> = timeline.points.iter().map(hhmm).collect();
        assert_eq!(labels, ["23:30", "00:00"]);
    }

    #[test]
    fn test_empty_records_give_empty_timeline() {
        let timeline = bucket_timeline(&[], &tracked(&["Editor"]), TIMELINE_BUCKET_MS).unwrap();
        assert!(timeline.points.is_empty());
        assert!(timeline.keys.is_empty());
    }

    #[test]
    fn test_non_positive_bucket_size_is_rejected() {
        let records = vec![record("Editor", 60_000, at(2024, 3, 5, 9, 5))];
        assert!(bucket_timeline(&records, &[], 0).is_err());
        assert!(bucket_timeline(&records, &[], -5).is_err());
    }
}
