pub mod aggregator;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod platform;
pub mod store;
#[cfg(test)]
mod test_utils;
pub mod tracker;
pub mod validation;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::platform::{ForegroundProbe, NativeProbe};
use crate::store::UsageStore;
use crate::tracker::{RecordSink, TrackerService};
use log::{error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Error type for Pulse startup failures
#[derive(Debug)]
pub enum InitError {
    Config(AppError),
    StoreOpen(AppError),
    TrackerStart(AppError),
    TrackerPanicked,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "Invalid configuration: {e}"),
            InitError::StoreOpen(e) => write!(f, "Could not open usage log directory: {e}"),
            InitError::TrackerStart(e) => write!(f, "Failed to start tracker: {e}"),
            InitError::TrackerPanicked => write!(f, "Tracker thread panicked"),
        }
    }
}

impl std::error::Error for InitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InitError::Config(e) | InitError::StoreOpen(e) | InitError::TrackerStart(e) => Some(e),
            InitError::TrackerPanicked => None,
        }
    }
}

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Track the foreground window into the configured store until the process exits.
///
/// The interval in progress when the process is killed is not recorded.
pub fn run(config: &AppConfig) -> Result<(), InitError> {
    config.validate().map_err(InitError::Config)?;

    let store = match UsageStore::open(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            error!("Pulse initialization failed: {e}");
            return Err(InitError::StoreOpen(e));
        }
    };
    info!("Logging usage to {}", store.dir().display());

    let probe: Arc<dyn ForegroundProbe> = Arc::new(NativeProbe::new());
    let sink: Arc<dyn RecordSink> = Arc::new(store);
    let tracker = TrackerService::new(probe, sink, config.tracker_config());

    let handle = tracker.start().map_err(InitError::TrackerStart)?;
    handle.join().map_err(|_| InitError::TrackerPanicked)
}
