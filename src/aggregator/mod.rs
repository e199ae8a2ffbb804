//! Pure views over loaded usage records.
//!
//! Nothing here touches the store; every function takes the records it
//! needs and returns a freshly computed view.

pub mod export;
pub mod timeline;

pub use export::to_delimited_text;
pub use timeline::bucket_timeline;

use crate::constants::MS_PER_MINUTE;
use crate::models::{AggregateRow, AppDetails, DetailRow, UsageRecord};
use indexmap::IndexMap;

/// Total duration per app, longest first.
///
/// Apps whose total is zero are dropped. Ties keep the order in which the
/// apps were first encountered.
pub fn summarize(records: &[UsageRecord]) -> Vec<AggregateRow> {
    let mut totals: IndexMap<&str, u64> = IndexMap::new();
    for record in records {
        let total = totals.entry(record.app.as_str()).or_insert(0);
        *total = total.saturating_add(record.duration_ms);
    }

    let mut rows: Vec<AggregateRow> = totals
        .into_iter()
        .filter(|&(_, duration_ms)| duration_ms > 0)
        .map(|(app, duration_ms)| AggregateRow {
            app: app.to_string(),
            duration_ms,
        })
        .collect();

    rows.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));
    rows
}

/// Names of the `n` apps with the most time in a summary
pub fn top_apps(rows: &[AggregateRow], n: usize) -> Vec<String> {
    rows.iter().take(n).map(|row| row.app.clone()).collect()
}

/// Strip every trailing " - {app}" from a window title.
///
/// Blank titles, and titles that were nothing but the suffix, become the app name.
pub fn normalize_title(title: &str, app: &str) -> String {
    let suffix = format!(" - {app}");
    // The suffix starts with a space, so only the right side may be trimmed while stripping
    let mut cleaned = title.trim_end();
    while let Some(stripped) = cleaned.strip_suffix(&suffix) {
        cleaned = stripped.trim_end();
    }
    let cleaned = cleaned.trim_start();

    if cleaned.is_empty() {
        app.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Per-title breakdown of the time spent in `app`
pub fn detail_by_app(records: &[UsageRecord], app: &str) -> AppDetails {
    let mut by_title: IndexMap<String, DetailRow> = IndexMap::new();
    let mut total_ms: u64 = 0;

    for record in records.iter().filter(|r| r.app == app && r.duration_ms > 0) {
        total_ms = total_ms.saturating_add(record.duration_ms);

        let title = normalize_title(&record.title, app);
        let row = by_title.entry(title.clone()).or_insert_with(|| DetailRow {
            title,
            duration_ms: 0,
            occurrences: 0,
        });
        row.duration_ms = row.duration_ms.saturating_add(record.duration_ms);
        row.occurrences = row.occurrences.saturating_add(1);
    }

    let mut rows: Vec<DetailRow> = by_title.into_values().collect();
    rows.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms));

    AppDetails { rows, total_ms }
}

/// Milliseconds as fractional minutes
#[allow(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "durations stay far below 2^52 ms, so the f64 is exact enough"
)]
pub fn ms_to_minutes(ms: u64) -> f64 {
    ms as f64 / MS_PER_MINUTE as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::titled;

    fn rows(pairs: &[(&str, u64)]) -> Vec<AggregateRow> {
        pairs
            .iter()
            .map(|&(app, duration_ms)| AggregateRow {
                app: app.to_string(),
                duration_ms,
            })
            .collect()
    }

    #[test]
    fn test_summarize_groups_and_ranks() {
        let records = vec![
            titled("Editor", "", 600_000),
            titled("Browser", "", 300_000),
            titled("Editor", "", 120_000),
        ];

        assert_eq!(
            summarize(&records),
            rows(&[("Editor", 720_000), ("Browser", 300_000)])
        );
    }

    #[test]
    fn test_summarize_drops_zero_totals_and_keeps_tie_order() {
        let records = vec![
            titled("Idle", "", 0),
            titled("Mail", "", 5_000),
            titled("Chat", "", 5_000),
            titled("Editor", "", 9_000),
        ];

        assert_eq!(
            summarize(&records),
            rows(&[("Editor", 9_000), ("Mail", 5_000), ("Chat", 5_000)])
        );
    }

    #[test]
    fn test_summarize_is_stable_on_its_own_output() {
        let records = vec![
            titled("Editor", "", 600_000),
            titled("Browser", "", 300_000),
            titled("Terminal", "", 300_000),
            titled("Editor", "", 120_000),
            titled("Browser", "", 1),
        ];

        let first = summarize(&records);
        let as_records: Vec<UsageRecord> = first
            .iter()
            .map(|row| titled(&row.app, "", row.duration_ms))
            .collect();

        assert_eq!(summarize(&as_records), first);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_top_apps_takes_leading_rows() {
        let summary = rows(&[("Editor", 3), ("Browser", 2), ("Chat", 1)]);
        assert_eq!(top_apps(&summary, 2), ["Editor", "Browser"]);
        assert_eq!(top_apps(&summary, 10).len(), 3);
    }

    #[test]
    fn test_normalize_title_strips_repeated_suffix() {
        assert_eq!(
            normalize_title("Inbox - Mail - Mail", "Mail"),
            "Inbox"
        );
        assert_eq!(normalize_title("  notes.md - Editor  ", "Editor"), "notes.md");
        assert_eq!(normalize_title("Editor - Docs", "Editor"), "Editor - Docs");
    }

    #[test]
    fn test_normalize_title_collapses_blank_to_app() {
        assert_eq!(normalize_title("", "Editor"), "Editor");
        assert_eq!(normalize_title("   ", "Editor"), "Editor");
        assert_eq!(normalize_title(" - Editor", "Editor"), "Editor");
        assert_eq!(normalize_title("  - Editor - Editor ", "Editor"), "Editor");
    }

    #[test]
    fn test_detail_by_app_groups_titles() {
        let records = vec![
            titled("Browser", "Docs - Browser", 60_000),
            titled("Editor", "main.rs - Editor", 500_000),
            titled("Browser", "Mail - Browser", 30_000),
            titled("Browser", "Docs", 90_000),
            titled("Browser", "", 10_000),
        ];

        let details = detail_by_app(&records, "Browser");

        assert_eq!(details.total_ms, 190_000);
        assert_eq!(
            details.rows,
            vec![
                DetailRow { title: "Docs".into(), duration_ms: 150_000, occurrences: 2 },
                DetailRow { title: "Mail".into(), duration_ms: 30_000, occurrences: 1 },
                DetailRow { title: "Browser".into(), duration_ms: 10_000, occurrences: 1 },
            ]
        );
    }

    #[test]
    fn test_detail_total_matches_app_sum() {
        let records = vec![
            titled("Editor", "a", 1_000),
            titled("Editor", "b", 2_500),
            titled("Editor", "a - Editor", 4_000),
            titled("Browser", "a", 8_000),
            titled("Editor", "c", 0),
        ];

        let expected: u64 = records
            .iter()
            .filter(|r| r.app == "Editor")
            .map(|r| r.duration_ms)
            .sum();
        let details = detail_by_app(&records, "Editor");

        assert_eq!(details.total_ms, expected);
        assert_eq!(details.rows.iter().map(|r| r.duration_ms).sum::<u64>(), expected);
    }

    #[test]
    fn test_detail_for_absent_app_is_empty() {
        let details = detail_by_app(&[titled("Editor", "a", 1_000)], "Browser");
        assert!(details.rows.is_empty());
        assert_eq!(details.total_ms, 0);
    }

    #[test]
    fn test_ms_to_minutes() {
        assert!((ms_to_minutes(90_000) - 1.5).abs() < f64::EPSILON);
        assert!(ms_to_minutes(0).abs() < f64::EPSILON);
    }
}
