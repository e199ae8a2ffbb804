// src/commands/mod.rs
//
// Query surface over recorded usage, organized by concern.

mod dtos;
pub mod range;
pub mod usage;

pub use dtos::{CsvExport, EntriesQuery};
pub use range::{DateWindow, UsageRange};
pub use usage::{current_window, UsageQueries};
