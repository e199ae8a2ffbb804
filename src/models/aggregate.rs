use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;

/// Total foreground time of one app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub app: String,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
}

/// Total foreground time of one window title inside an app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub title: String,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub occurrences: u32,
}

/// Per-title drill-down for a single app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDetails {
    pub rows: Vec<DetailRow>,
    #[serde(rename = "total")]
    pub total_ms: u64,
}

/// One bucket of the stacked timeline; values are minutes keyed by series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub bucket_start: DateTime<FixedOffset>,
    pub values: IndexMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub points: Vec<TimelinePoint>,
    pub keys: Vec<String>,
}
