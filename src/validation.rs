use crate::constants::{MAX_POLL_INTERVAL_MS, MAX_TIMELINE_TOP_N, MIN_POLL_INTERVAL_MS};
use crate::error::AppError;

/// Validate the tracker poll interval in milliseconds.
pub fn validate_poll_interval_ms(interval_ms: u64) -> Result<(), AppError> {
    if interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(AppError::InvalidInput {
            field: "poll_interval_ms",
            reason: format!("must be at least {MIN_POLL_INTERVAL_MS} ms"),
        });
    }
    if interval_ms > MAX_POLL_INTERVAL_MS {
        return Err(AppError::InvalidInput {
            field: "poll_interval_ms",
            reason: "cannot exceed 1 hour".into(),
        });
    }
    Ok(())
}

/// Validate the probe timeout; it must fit inside one poll interval.
pub fn validate_probe_timeout_ms(timeout_ms: u64, poll_interval_ms: u64) -> Result<(), AppError> {
    if timeout_ms == 0 {
        return Err(AppError::InvalidInput {
            field: "probe_timeout_ms",
            reason: "must be positive".into(),
        });
    }
    if timeout_ms > poll_interval_ms {
        return Err(AppError::InvalidInput {
            field: "probe_timeout_ms",
            reason: format!("cannot exceed the poll interval ({poll_interval_ms} ms)"),
        });
    }
    Ok(())
}

/// Validate how many apps get their own timeline series.
pub fn validate_top_n(top_n: usize) -> Result<(), AppError> {
    if top_n == 0 {
        return Err(AppError::InvalidInput {
            field: "top_n",
            reason: "must be positive".into(),
        });
    }
    if top_n > MAX_TIMELINE_TOP_N {
        return Err(AppError::InvalidInput {
            field: "top_n",
            reason: format!("cannot exceed {MAX_TIMELINE_TOP_N}"),
        });
    }
    Ok(())
}

/// Validate an app name used as a filter. Returns the name unchanged.
pub fn validate_app_name(app: &str) -> Result<&str, AppError> {
    if app.trim().is_empty() {
        return Err(AppError::InvalidInput {
            field: "app",
            reason: "cannot be empty".into(),
        });
    }
    Ok(app)
}
