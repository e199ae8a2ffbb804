// src/constants.rs

/// Milliseconds in one minute
pub const MS_PER_MINUTE: u64 = 60_000;

/// Default tracker poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default upper bound on a single foreground probe call
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_000;

/// Shortest poll interval accepted from configuration
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Longest poll interval accepted from configuration (1 hour)
pub const MAX_POLL_INTERVAL_MS: u64 = 60 * 60 * 1_000;

/// Width of a timeline bucket in milliseconds (30 minutes)
pub const TIMELINE_BUCKET_MS: i64 = 30 * 60 * 1_000;

/// Number of apps given their own timeline series by default
pub const DEFAULT_TIMELINE_TOP_N: usize = 5;

/// Maximum number of apps given their own timeline series
pub const MAX_TIMELINE_TOP_N: usize = 50;

/// Series key collecting every untracked app in the timeline
pub const OTHER_SERIES: &str = "Other";

/// App name used when the probe or a stored record has none
pub const UNKNOWN_APP: &str = "Unknown";

/// Directory under the platform data dir holding day partitions
pub const USAGE_LOG_DIR: &str = "usage-logs";

/// File name prefix of a day partition
pub const PARTITION_PREFIX: &str = "usage-";

/// File name suffix of a day partition
pub const PARTITION_SUFFIX: &str = ".json";

/// Date format embedded in partition file names
pub const PARTITION_DATE_FORMAT: &str = "%Y-%m-%d";
