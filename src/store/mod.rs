pub mod partition;

use crate::error::AppError;
use crate::models::{NewUsageRecord, UsageRecord};
use crate::tracker::RecordSink;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Day-partitioned log of usage records.
///
/// Each calendar day lives in its own JSON file inside a single flat
/// directory. Writes replace the whole partition through a temporary file
/// and an atomic rename, so a concurrent reader sees either the old or the
/// new contents. Only one writer is expected at a time.
#[derive(Debug, Clone)]
pub struct UsageStore {
    dir: PathBuf,
}

impl UsageStore {
    /// Open the store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(partition::file_name(date))
    }

    /// Append a record to today's partition, stamped with the current local time.
    ///
    /// Returns `None` when the record carries no duration and was skipped.
    pub fn append(&self, record: NewUsageRecord) -> Result<Option<UsageRecord>, AppError> {
        self.append_at(record, Local::now().fixed_offset())
    }

    /// Append a record stamped with `timestamp`; the partition is the timestamp's date.
    pub fn append_at(
        &self,
        record: NewUsageRecord,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<Option<UsageRecord>, AppError> {
        if record.duration_ms == 0 {
            log::debug!("Skipping zero-length interval for {}", record.app);
            return Ok(None);
        }

        let record = record.stamped(timestamp);
        let date = record.partition_date();

        // An unreadable partition is left alone rather than overwritten
        let mut records = self.try_load_day(date)?;
        records.push(record.clone());
        self.write_partition(date, &records)?;

        Ok(Some(record))
    }

    /// Records of one day; a missing partition is an empty day, an unreadable one is an error.
    pub fn try_load_day(&self, date: NaiveDate) -> Result<Vec<UsageRecord>, AppError> {
        let path = self.partition_path(date);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        serde_json::from_str(&content).map_err(|source| AppError::CorruptPartition { path, source })
    }

    /// Records of one day, or nothing if the partition is missing or unreadable.
    pub fn load_day(&self, date: NaiveDate) -> Vec<UsageRecord> {
        match self.try_load_day(date) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Treating {date} as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Dates that currently have a partition, oldest first
    pub fn partition_dates(&self) -> Result<Vec<NaiveDate>, AppError> {
        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(date) = entry.file_name().to_str().and_then(partition::parse_file_name) {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }

    /// Records of every partition dated within `[start, end]`, concatenated oldest day first.
    ///
    /// Unreadable partitions contribute nothing; failing to list the
    /// directory is reported as an error.
    pub fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<UsageRecord>, AppError> {
        let records = self
            .partition_dates()?
            .into_iter()
            .filter(|date| (start..=end).contains(date))
            .flat_map(|date| self.load_day(date))
            .collect();
        Ok(records)
    }

    fn write_partition(&self, date: NaiveDate, records: &[UsageRecord]) -> Result<(), AppError> {
        let tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(self.partition_path(date))
            .map_err(|e| AppError::Io(e.error))?;
        Ok(())
    }
}

impl RecordSink for UsageStore {
    fn record(&self, interval: NewUsageRecord) -> Result<(), AppError> {
        if let Some(written) = self.append(interval)? {
            log::info!("Logged {} ({} ms)", written.app, written.duration_ms);
        }
        Ok(())
    }
}
