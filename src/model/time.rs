// File: ./src/model/time.rs
// Time-of-day windows, weekday numbering and the serde helpers for both.
use crate::model::error::ValidationError;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parses a time-of-day string. Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Weekday number as stored by the entity store: 0 = Sunday ... 6 = Saturday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

pub fn weekday_from_index(index: u8) -> Result<Weekday, ValidationError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ValidationError::DayOutOfRange(other)),
    }
}

/// Accepts "mo", "mon", "monday" (any case) as well as the numeric 0-6 form.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    let lower = s.trim().to_lowercase();
    if let Ok(n) = lower.parse::<u8>() {
        return weekday_from_index(n).ok();
    }
    match lower.as_str() {
        "mo" | "mon" | "monday" => Some(Weekday::Mon),
        "tu" | "tue" | "tuesday" => Some(Weekday::Tue),
        "we" | "wed" | "wednesday" => Some(Weekday::Wed),
        "th" | "thu" | "thursday" => Some(Weekday::Thu),
        "fr" | "fri" | "friday" => Some(Weekday::Fri),
        "sa" | "sat" | "saturday" => Some(Weekday::Sat),
        "su" | "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// First date on or after `from` that falls on `day`.
pub fn next_on_or_after(from: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (weekday_index(day) as i64 - weekday_index(from.weekday()) as i64).rem_euclid(7);
    from + Duration::days(ahead)
}

/// Half-open `[start, end)` interval within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidWindow {
                start: format_time(start),
                end: format_time(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Back-to-back windows (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_time(self.start), format_time(self.end))
    }
}

/// Serde adapter writing `HH:MM` and reading either `HH:MM` or `HH:MM:SS`.
pub mod hhmm {
    use super::{format_time, parse_time};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_time(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for the 0-6 (Sunday first) weekday number.
pub mod weekday_number {
    use super::{weekday_from_index, weekday_index};
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(weekday_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        weekday_from_index(raw).map_err(serde::de::Error::custom)
    }
}
