//! Shared test utilities for Pulse.
//!
//! This module provides common setup functions used across test modules.

#![cfg(test)]

use crate::models::{NewUsageRecord, UsageRecord};
use crate::store::UsageStore;
use chrono::{DateTime, FixedOffset, TimeZone};
use tempfile::{tempdir, TempDir};

/// Create a store in a fresh temporary directory.
///
/// Returns a tuple of (UsageStore, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the partitions from being deleted.
pub fn setup_test_store() -> (UsageStore, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test store");
    let store = UsageStore::open(dir.path()).expect("Failed to open test store");
    (store, dir)
}

/// Offset every test timestamp is written in
pub fn test_offset() -> FixedOffset {
    FixedOffset::east_opt(3600).expect("valid offset")
}

/// A wall-clock instant in the test offset
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    test_offset()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

pub fn new_record(app: &str, duration_ms: u64) -> NewUsageRecord {
    NewUsageRecord::new(app, "", &format!("/usr/bin/{}", app.to_lowercase()), duration_ms)
}

pub fn record(app: &str, duration_ms: u64, timestamp: DateTime<FixedOffset>) -> UsageRecord {
    new_record(app, duration_ms).stamped(timestamp)
}

pub fn titled(app: &str, title: &str, duration_ms: u64) -> UsageRecord {
    NewUsageRecord::new(app, title, "", duration_ms).stamped(at(2024, 3, 5, 9, 0))
}
