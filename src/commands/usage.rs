use crate::aggregator::{bucket_timeline, detail_by_app, summarize, to_delimited_text, top_apps};
use crate::constants::TIMELINE_BUCKET_MS;
use crate::error::AppError;
use crate::models::{AggregateRow, AppDetails, Timeline, UsageRecord};
use crate::platform::{ActiveWindow, ForegroundProbe};
use crate::store::UsageStore;
use crate::tracker::ProbeWorker;
use crate::validation::{validate_app_name, validate_top_n};
use chrono::{DateTime, FixedOffset, Local};
use std::sync::Arc;
use std::time::Duration;

use super::{CsvExport, EntriesQuery, UsageRange};

fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Read-only queries over the usage store.
///
/// Every call loads the partitions it needs and recomputes its view; an
/// empty result means no activity, an `Err` means the data could not be
/// fetched at all.
pub struct UsageQueries {
    store: UsageStore,
    now: fn() -> DateTime<FixedOffset>,
}

impl UsageQueries {
    pub fn new(store: UsageStore) -> Self {
        Self {
            store,
            now: local_now,
        }
    }

    /// Same queries evaluated against a custom clock
    pub fn with_clock(store: UsageStore, now: fn() -> DateTime<FixedOffset>) -> Self {
        Self { store, now }
    }

    /// Every range goes through the directory listing, so a missing or
    /// unreadable store is an error rather than an empty day.
    fn load(&self, range: UsageRange) -> Result<Vec<UsageRecord>, AppError> {
        let window = range.window(&(self.now)());
        self.store.load_range(window.start, window.end)
    }

    pub fn get_today_summary(&self) -> Result<Vec<AggregateRow>, AppError> {
        self.get_summary(UsageRange::Day)
    }

    pub fn get_summary(&self, range: UsageRange) -> Result<Vec<AggregateRow>, AppError> {
        Ok(summarize(&self.load(range)?))
    }

    /// Raw records of a range, optionally only those of one app (exact match)
    pub fn get_entries(&self, query: &EntriesQuery) -> Result<Vec<UsageRecord>, AppError> {
        let mut entries = self.load(query.range)?;
        if let Some(app) = query.app.as_deref() {
            entries.retain(|entry| entry.app == app);
        }
        Ok(entries)
    }

    pub fn get_app_details(&self, range: UsageRange, app: &str) -> Result<AppDetails, AppError> {
        let app = validate_app_name(app)?;
        let entries = self.get_entries(&EntriesQuery {
            range,
            app: Some(app.to_string()),
        })?;
        Ok(detail_by_app(&entries, app))
    }

    /// Half-hour stacked timeline of the `top_n` busiest apps plus "Other"
    pub fn get_timeline(&self, range: UsageRange, top_n: usize) -> Result<Timeline, AppError> {
        validate_top_n(top_n)?;
        let records = self.load(range)?;
        let tracked = top_apps(&summarize(&records), top_n);
        bucket_timeline(&records, &tracked, TIMELINE_BUCKET_MS)
    }

    pub fn export_csv(&self, range: UsageRange) -> Result<CsvExport, AppError> {
        let rows = self.get_summary(range)?;
        let total_ms = rows.iter().map(|row| row.duration_ms).sum();
        let slug = range.label().to_lowercase().replace(' ', "-");

        Ok(CsvExport {
            file_name: format!("pulse-app-usage-{slug}.csv"),
            content: to_delimited_text(&rows, total_ms),
        })
    }
}

/// One-off read of the foreground window, bounded by `timeout`
pub fn current_window(
    probe: &Arc<dyn ForegroundProbe>,
    timeout: Duration,
) -> Result<Option<ActiveWindow>, AppError> {
    ProbeWorker::new(Arc::clone(probe), timeout).query()
}
