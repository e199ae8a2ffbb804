use super::ms_to_minutes;
use crate::models::AggregateRow;

const DELIMITER: char = ',';
const LINE_BREAK: &str = "\r\n";
const HEADER: &str = "Application,Duration (minutes),Share (%)";

/// Quote a field when it contains the delimiter, a quote or a line break
fn escape_field(field: &str) -> String {
    if field.contains([DELIMITER, '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn share_percent(duration_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        0.0
    } else {
        ms_to_minutes(duration_ms) / ms_to_minutes(total_ms) * 100.0
    }
}

/// Render a summary as CSV: app, minutes and share of `total_ms`, both to two decimals
pub fn to_delimited_text(rows: &[AggregateRow], total_ms: u64) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADER.to_string());
    lines.extend(rows.iter().map(|row| {
        format!(
            "{}{DELIMITER}{:.2}{DELIMITER}{:.2}",
            escape_field(&row.app),
            ms_to_minutes(row.duration_ms),
            share_percent(row.duration_ms, total_ms),
        )
    }));
    lines.join(LINE_BREAK)
}
