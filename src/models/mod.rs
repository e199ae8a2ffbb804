pub mod aggregate;
pub mod usage_record;

pub use aggregate::{AggregateRow, AppDetails, DetailRow, Timeline, TimelinePoint};
pub use usage_record::{normalize_app_name, NewUsageRecord, UsageRecord};
