use crate::constants::{PARTITION_DATE_FORMAT, PARTITION_PREFIX, PARTITION_SUFFIX};
use chrono::NaiveDate;

/// File name of the partition holding `date`, e.g. `usage-2024-03-05.json`
pub fn file_name(date: NaiveDate) -> String {
    format!(
        "{PARTITION_PREFIX}{}{PARTITION_SUFFIX}",
        date.format(PARTITION_DATE_FORMAT)
    )
}

/// Parse the date out of a partition file name; `None` for anything else in the directory
pub fn parse_file_name(name: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(PARTITION_PREFIX)?
        .strip_suffix(PARTITION_SUFFIX)?;
    NaiveDate::parse_from_str(date, PARTITION_DATE_FORMAT).ok()
}
