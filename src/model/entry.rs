// File: ./src/model/entry.rs
use crate::model::error::ValidationError;
use crate::model::time::{TimeWindow, hhmm, weekday_number};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// Free-form classification of a special session. The well-known labels get
/// their own variants; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Revision,
    Exam,
    Replacement,
    ExtraClass,
    Custom(String),
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "revision" => EventType::Revision,
            "exam" => EventType::Exam,
            "replacement" => EventType::Replacement,
            "extra" | "extraclass" => EventType::ExtraClass,
            _ => EventType::Custom(raw.trim().to_string()),
        }
    }
}

impl From<&str> for EventType {
    fn from(raw: &str) -> Self {
        EventType::from(raw.to_string())
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Revision => write!(f, "Revision"),
            EventType::Exam => write!(f, "Exam"),
            EventType::Replacement => write!(f, "Replacement"),
            EventType::ExtraClass => write!(f, "Extra Class"),
            EventType::Custom(label) => write!(f, "{}", label),
        }
    }
}

/// When an entry happens. `Regular` recurs every week; `Special` happens once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Schedule {
    #[serde(rename_all = "camelCase")]
    Regular {
        #[serde(with = "weekday_number")]
        day_of_week: Weekday,
    },
    #[serde(rename_all = "camelCase")]
    Special {
        specific_date: NaiveDate,
        event_type: EventType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    #[serde(default = "default_id")]
    pub id: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<String>,
    pub subject_id: String,
    pub faculty_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(flatten)]
    pub schedule: Schedule,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TimetableEntry {
    pub fn regular(
        class: &str,
        subject_id: &str,
        faculty_id: &str,
        day_of_week: Weekday,
        window: TimeWindow,
    ) -> Self {
        Self::with_schedule(
            class,
            subject_id,
            faculty_id,
            Schedule::Regular { day_of_week },
            window,
        )
    }

    pub fn special(
        class: &str,
        subject_id: &str,
        faculty_id: &str,
        specific_date: NaiveDate,
        event_type: EventType,
        window: TimeWindow,
    ) -> Self {
        Self::with_schedule(
            class,
            subject_id,
            faculty_id,
            Schedule::Special {
                specific_date,
                event_type,
                notes: None,
            },
            window,
        )
    }

    fn with_schedule(
        class: &str,
        subject_id: &str,
        faculty_id: &str,
        schedule: Schedule,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: default_id(),
            class: class.to_string(),
            division_id: None,
            subject_id: subject_id.to_string(),
            faculty_id: faculty_id.to_string(),
            room_id: None,
            schedule,
            start_time: window.start,
            end_time: window.end,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn in_room(mut self, room_id: &str) -> Self {
        self.room_id = Some(room_id.to_string());
        self
    }

    pub fn for_division(mut self, division_id: &str) -> Self {
        self.division_id = Some(division_id.to_string());
        self
    }

    pub fn with_notes(mut self, text: &str) -> Self {
        if let Schedule::Special { notes, .. } = &mut self.schedule {
            *notes = Some(text.to_string());
        }
        self
    }

    /// The assigned room, treating a blank id as no room.
    pub fn room(&self) -> Option<&str> {
        self.room_id
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self.schedule, Schedule::Special { .. })
    }

    pub fn day_of_week(&self) -> Option<Weekday> {
        match &self.schedule {
            Schedule::Regular { day_of_week } => Some(*day_of_week),
            Schedule::Special { .. } => None,
        }
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        match &self.schedule {
            Schedule::Special { specific_date, .. } => Some(*specific_date),
            Schedule::Regular { .. } => None,
        }
    }

    pub fn event_type(&self) -> Option<&EventType> {
        match &self.schedule {
            Schedule::Special { event_type, .. } => Some(event_type),
            Schedule::Regular { .. } => None,
        }
    }

    /// Whether the entry is scheduled on `date`, before any override is applied.
    pub fn falls_on(&self, date: NaiveDate) -> bool {
        match &self.schedule {
            Schedule::Regular { day_of_week } => *day_of_week == date.weekday(),
            Schedule::Special { specific_date, .. } => *specific_date == date,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.class.trim().is_empty() {
            return Err(ValidationError::MissingClass);
        }
        if self.subject_id.trim().is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        if self.faculty_id.trim().is_empty() {
            return Err(ValidationError::MissingFaculty);
        }
        TimeWindow::new(self.start_time, self.end_time)?;
        Ok(())
    }
}
