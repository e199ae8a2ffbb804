use crate::error::AppError;
use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Period a query covers, always ending now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageRange {
    #[default]
    Day,
    Week,
    Month,
}

/// Inclusive span of partition dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl UsageRange {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageRange::Day => "day",
            UsageRange::Week => "week",
            UsageRange::Month => "month",
        }
    }

    /// Human label, also used to name exports
    pub fn label(self) -> &'static str {
        match self {
            UsageRange::Day => "Today",
            UsageRange::Week => "Last 7 Days",
            UsageRange::Month => "Last 30 Days",
        }
    }

    /// Partition dates covered by this range as seen at `now`.
    ///
    /// Week starts at now minus 7 days, month at now minus one calendar
    /// month. A day counts when its midnight falls inside `[start, now]`, so
    /// the day the range starts in is only included if it starts exactly at
    /// midnight.
    pub fn window<Tz: TimeZone>(self, now: &DateTime<Tz>) -> DateWindow {
        let end = now.date_naive();
        let start = match self {
            UsageRange::Day => return DateWindow { start: end, end },
            UsageRange::Week => now.clone() - TimeDelta::days(7),
            UsageRange::Month => now
                .clone()
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now.clone() - TimeDelta::days(30)),
        };

        DateWindow {
            start: first_midnight_at_or_after(&start),
            end,
        }
    }
}

fn first_midnight_at_or_after<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    let date = instant.date_naive();
    if instant.time() == NaiveTime::MIN {
        date
    } else {
        date.succ_opt().unwrap_or(date)
    }
}

impl fmt::Display for UsageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageRange {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "today" => Ok(UsageRange::Day),
            "week" => Ok(UsageRange::Week),
            "month" => Ok(UsageRange::Month),
            other => Err(AppError::InvalidInput {
                field: "range",
                reason: format!("'{other}' is not one of day, week, month"),
            }),
        }
    }
}
