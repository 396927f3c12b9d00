// File: ./src/views.rs
//! Day, "tomorrow" and week views over the resolver.
//!
//! None of these read the clock: the caller passes the reference date, so
//! "tomorrow" is simply `reference_date + 1`.

use crate::model::{Schedule, TimetableEntry};
use crate::resolver::{ScheduleFilter, ScheduleResolver};
use crate::store::Directory;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

/// A resolved session with display names attached. Names are `None` when the
/// referenced room, subject, faculty member or division no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub entry_id: String,
    pub date: NaiveDate,
    #[serde(with = "crate::model::time::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::model::time::hhmm")]
    pub end: NaiveTime,
    pub class: String,
    pub division: Option<String>,
    pub subject: Option<String>,
    pub faculty: Option<String>,
    pub room_id: Option<String>,
    pub room: Option<String>,
    /// `None` for regular sessions.
    pub event_type: Option<String>,
    pub notes: Option<String>,
}

pub fn describe(date: NaiveDate, entry: &TimetableEntry, dir: &dyn Directory) -> SessionView {
    let (event_type, notes) = match &entry.schedule {
        Schedule::Special {
            event_type, notes, ..
        } => (Some(event_type.to_string()), notes.clone()),
        Schedule::Regular { .. } => (None, None),
    };
    SessionView {
        entry_id: entry.id.clone(),
        date,
        start: entry.start_time,
        end: entry.end_time,
        class: entry.class.clone(),
        division: entry
            .division_id
            .as_deref()
            .and_then(|id| dir.division(id))
            .map(|d| d.name.clone()),
        subject: dir.subject(&entry.subject_id).map(|s| s.name.clone()),
        faculty: dir.faculty(&entry.faculty_id).map(|f| f.name.clone()),
        room_id: entry.room().map(str::to_string),
        room: entry.room().and_then(|id| dir.room(id)).map(|r| r.name.clone()),
        event_type,
        notes,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub sessions: Vec<SessionView>,
}

pub fn day(
    resolver: &ScheduleResolver,
    date: NaiveDate,
    entries: &[TimetableEntry],
    filter: &ScheduleFilter,
    dir: &dyn Directory,
) -> DayView {
    let sessions = resolver
        .resolve(date, entries, filter)
        .into_iter()
        .map(|e| describe(date, e, dir))
        .collect();
    DayView { date, sessions }
}

pub fn tomorrow(
    resolver: &ScheduleResolver,
    reference_date: NaiveDate,
    entries: &[TimetableEntry],
    filter: &ScheduleFilter,
    dir: &dyn Directory,
) -> DayView {
    day(
        resolver,
        reference_date + Duration::days(1),
        entries,
        filter,
        dir,
    )
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, week_starts_on: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_sunday() as i64
        - week_starts_on.num_days_from_sunday() as i64)
        .rem_euclid(7);
    date - Duration::days(back)
}

/// Seven consecutive resolved days of the week containing `reference_date`.
pub fn week(
    resolver: &ScheduleResolver,
    reference_date: NaiveDate,
    week_starts_on: Weekday,
    entries: &[TimetableEntry],
    filter: &ScheduleFilter,
    dir: &dyn Directory,
) -> Vec<DayView> {
    let first = week_start(reference_date, week_starts_on);
    (0..7)
        .map(|offset| day(resolver, first + Duration::days(offset), entries, filter, dir))
        .collect()
}
