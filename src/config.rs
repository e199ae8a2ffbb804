use crate::constants::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_TIMELINE_TOP_N, USAGE_LOG_DIR,
};
use crate::error::AppError;
use crate::tracker::TrackerConfig;
use crate::validation::{validate_poll_interval_ms, validate_probe_timeout_ms, validate_top_n};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "PULSE_DATA_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "PULSE_POLL_INTERVAL_MS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "PULSE_PROBE_TIMEOUT_MS";
pub const ENV_TIMELINE_TOP_N: &str = "PULSE_TIMELINE_TOP_N";

/// Settings supplied by the caller; anything left `None` falls back to a default.
///
/// The binary fills these from flags or the `PULSE_*` variables above.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
    pub timeline_top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub timeline_top_n: usize,
}

impl AppConfig {
    /// Apply defaults to whatever was not overridden, then validate
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, AppError> {
        let data_dir = match overrides.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        let config = Self {
            data_dir,
            poll_interval_ms: overrides.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            probe_timeout_ms: overrides.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            timeline_top_n: overrides.timeline_top_n.unwrap_or(DEFAULT_TIMELINE_TOP_N),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_poll_interval_ms(self.poll_interval_ms)?;
        validate_probe_timeout_ms(self.probe_timeout_ms, self.poll_interval_ms)?;
        validate_top_n(self.timeline_top_n)?;
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
        }
    }
}

/// `<platform data dir>/usage-logs`
pub fn default_data_dir() -> Result<PathBuf, AppError> {
    let proj_dirs = ProjectDirs::from("com", "pulse", "Pulse").ok_or(AppError::NoProjectDirs)?;
    Ok(proj_dirs.data_dir().join(USAGE_LOG_DIR))
}
