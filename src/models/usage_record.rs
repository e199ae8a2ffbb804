use crate::constants::UNKNOWN_APP;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A completed foreground interval that has not been written yet.
///
/// The tracker produces these; the store stamps them with the write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUsageRecord {
    pub app: String,
    pub title: String,
    pub path: String,
    pub duration_ms: u64,
}

impl NewUsageRecord {
    pub fn new(app: &str, title: &str, path: &str, duration_ms: u64) -> Self {
        Self {
            app: normalize_app_name(app),
            title: title.to_string(),
            path: path.to_string(),
            duration_ms,
        }
    }

    pub fn stamped(self, timestamp: DateTime<FixedOffset>) -> UsageRecord {
        UsageRecord {
            app: self.app,
            title: self.title,
            path: self.path,
            duration_ms: self.duration_ms,
            timestamp,
        }
    }
}

/// One persisted interval of foreground focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub timestamp: DateTime<FixedOffset>,
}

impl UsageRecord {
    /// Calendar date of the partition this record belongs to, in the writer's offset
    pub fn partition_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Blank app names are reported as "Unknown"
pub fn normalize_app_name(app: &str) -> String {
    if app.trim().is_empty() {
        UNKNOWN_APP.to_string()
    } else {
        app.to_string()
    }
}

fn deserialize_app_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_app_name(raw.as_deref().unwrap_or_default()))
}
