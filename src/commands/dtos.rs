// src/commands/dtos.rs

use super::UsageRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntriesQuery {
    pub range: UsageRange,
    pub app: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}
