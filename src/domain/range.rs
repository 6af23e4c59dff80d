use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire format of every timestamp the API accepts and emits.
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const HOUR_KEY_FORMAT: &str = "%Y-%m-%d %H:00:00";
pub const DAY_FORMAT: &str = "%Y-%m-%d";
pub const MINUTE_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:00";

/// Longest heatmap window, in days.
pub const MAX_DAY_SPAN: i64 = 366;
/// Calendar years accepted in query parameters.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const ACCEPTED_FORMATS: [&str; 4] = [
    WIRE_FORMAT,
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("missing query parameter: {0}")]
    Missing(&'static str),
    #[error("invalid {field}: '{value}' (expected YYYY-MM-DD HH:mm:ss)")]
    Malformed { field: &'static str, value: String },
    #[error("invalid {field}: '{value}' (expected YYYY-MM-DD)")]
    MalformedDay { field: &'static str, value: String },
    #[error("start {start} is after end {end}")]
    Inverted { start: String, end: String },
    #[error("{field} '{value}' is outside the supported years 1-9999")]
    OutOfRange { field: &'static str, value: String },
    #[error("range {start} to {end} spans more than {max_days} days")]
    TooLong {
        start: String,
        end: String,
        max_days: i64,
    },
}

/// Timezone-naive window, inclusive at both ends like the `BETWEEN` it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted {
                start: start.format(WIRE_FORMAT).to_string(),
                end: end.format(WIRE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a range from the raw `startDateTime`/`endDateTime` query values.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, RangeError> {
        let start = start.ok_or(RangeError::Missing("startDateTime"))?;
        let end = end.ok_or(RangeError::Missing("endDateTime"))?;
        Self::new(
            parse_timestamp("startDateTime", start)?,
            parse_timestamp("endDateTime", end)?,
        )
    }

    /// Midnight of `now`'s day up to `now`.
    pub fn today_until(now: NaiveDateTime) -> Self {
        Self {
            start: now.date().and_time(NaiveTime::MIN),
            end: now,
        }
    }

    pub fn start_param(&self) -> String {
        self.start.format(WIRE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(WIRE_FORMAT).to_string()
    }

    /// Query pairs in the API's parameter convention.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("startDateTime", self.start_param()),
            ("endDateTime", self.end_param()),
        ]
    }
}

/// Half-open span of whole days `[first, end)` used by the heatmap, at most
/// [`MAX_DAY_SPAN`] days long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub first: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    pub fn new(first: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if first > end {
            return Err(RangeError::Inverted {
                start: first.format(DAY_FORMAT).to_string(),
                end: end.format(DAY_FORMAT).to_string(),
            });
        }
        if (end - first).num_days() > MAX_DAY_SPAN {
            return Err(RangeError::TooLong {
                start: first.format(DAY_FORMAT).to_string(),
                end: end.format(DAY_FORMAT).to_string(),
                max_days: MAX_DAY_SPAN,
            });
        }
        Ok(Self { first, end })
    }

    pub fn parse(first: Option<&str>, end: Option<&str>) -> Result<Self, RangeError> {
        let first = first.ok_or(RangeError::Missing("startDate"))?;
        let end = end.ok_or(RangeError::Missing("endDate"))?;
        Self::new(parse_day("startDate", first)?, parse_day("endDate", end)?)
    }

    /// Every calendar day touched by a timestamp window. Longer windows keep
    /// their last [`MAX_DAY_SPAN`] days.
    pub fn covering(range: &DateRange) -> Self {
        let last = range.end.date();
        let end = last.succ_opt().unwrap_or(last);
        let earliest = end
            .checked_sub_signed(Duration::days(MAX_DAY_SPAN))
            .unwrap_or(end);
        Self {
            first: range.start.date().max(earliest).min(end),
            end,
        }
    }

    pub fn num_days(&self) -> usize {
        (self.end - self.first).num_days().max(0) as usize
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.first && day < self.end
    }

    /// The timestamp window covering every day, ending at the last second
    /// before `end`.
    pub fn to_date_range(&self) -> DateRange {
        let start = self.first.and_time(NaiveTime::MIN);
        let end = self
            .end
            .and_time(NaiveTime::MIN)
            .checked_sub_signed(Duration::seconds(1))
            .unwrap_or(start)
            .max(start);
        DateRange { start, end }
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.first.format(DAY_FORMAT).to_string()),
            ("endDate", self.end.format(DAY_FORMAT).to_string()),
        ]
    }
}

pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, RangeError> {
    let trimmed = value.trim();
    let ts = ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| RangeError::Malformed {
            field,
            value: value.to_string(),
        })?;
    check_year(field, value, ts.date())?;
    Ok(ts)
}

pub fn parse_day(field: &'static str, value: &str) -> Result<NaiveDate, RangeError> {
    let day = NaiveDate::parse_from_str(value.trim(), DAY_FORMAT).map_err(|_| {
        RangeError::MalformedDay {
            field,
            value: value.to_string(),
        }
    })?;
    check_year(field, value, day)?;
    Ok(day)
}

fn check_year(field: &'static str, value: &str, day: NaiveDate) -> Result<(), RangeError> {
    if SUPPORTED_YEARS.contains(&day.year()) {
        Ok(())
    } else {
        Err(RangeError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}

/// Floor a timestamp to the start of its hour.
pub fn hour_floor(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), 0, 0)
        .unwrap_or(ts)
}

/// Floor a timestamp to the start of its minute.
pub fn minute_floor(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), ts.minute(), 0)
        .unwrap_or(ts)
}

pub fn hour_key(hour: NaiveDateTime) -> String {
    hour.format(HOUR_KEY_FORMAT).to_string()
}

/// Parse a key produced by [`hour_key`]; any accepted timestamp works.
pub fn parse_hour_key(key: &str) -> Option<NaiveDateTime> {
    parse_timestamp("hour", key).ok()
}
