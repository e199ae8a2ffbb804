use std::path::PathBuf;
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Partition {} is unreadable: {source}", .path.display())]
    CorruptPartition {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Foreground probe failed: {0}")]
    Probe(String),

    #[error("Foreground probe did not answer within {timeout_ms} ms")]
    ProbeTimeout { timeout_ms: u64 },

    #[error("Previous foreground probe has not answered yet")]
    ProbeBusy,

    #[error("Could not determine project directories")]
    NoProjectDirs,
}

impl AppError {
    /// True when the error only means a partition's bytes could not be parsed
    pub fn is_corrupt_partition(&self) -> bool {
        matches!(self, AppError::CorruptPartition { .. })
    }
}
