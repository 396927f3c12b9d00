// File: ./src/occupancy.rs
//! Read-only room views over the resolver's output: who is in which room on a
//! date, which rooms are free for a window, and an hour-by-hour grid.

use crate::model::{Room, TimeWindow, TimetableEntry};
use crate::resolver::ScheduleResolver;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::HashMap;

/// One booked stretch of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub entry_id: String,
    #[serde(with = "crate::model::time::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "crate::model::time::hhmm")]
    pub end: NaiveTime,
    pub subject_id: String,
    pub class: String,
}

impl Interval {
    fn from_entry(entry: &TimetableEntry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            start: entry.start_time,
            end: entry.end_time,
            subject_id: entry.subject_id.clone(),
            class: entry.class.clone(),
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomOccupancy<'r> {
    pub room: &'r Room,
    pub intervals: Vec<Interval>,
}

impl RoomOccupancy<'_> {
    pub fn is_free_during(&self, window: &TimeWindow) -> bool {
        !self.intervals.iter().any(|i| i.window().overlaps(window))
    }
}

/// One hour column of the occupancy grid, `[hour:00, hour+1:00)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub hour: u32,
    pub sessions: Vec<Interval>,
}

impl GridCell {
    pub fn is_free(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow<'r> {
    pub room: &'r Room,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancyGrid<'r> {
    pub date: NaiveDate,
    pub hours: Vec<u32>,
    pub rows: Vec<GridRow<'r>>,
}

fn hour_slot(hour: u32) -> Option<TimeWindow> {
    let start = NaiveTime::from_hms_opt(hour, 0, 0)?;
    // The last slot of the day runs to 23:59:59.
    let end = NaiveTime::from_hms_opt(hour + 1, 0, 0)
        .or_else(|| NaiveTime::from_hms_opt(23, 59, 59))?;
    Some(TimeWindow { start, end })
}

#[derive(Debug, Clone, Default)]
pub struct OccupancyEngine {
    resolver: ScheduleResolver,
}

impl OccupancyEngine {
    pub fn new(resolver: ScheduleResolver) -> Self {
        Self { resolver }
    }

    /// Intervals per room, in `rooms` order. Sessions without a room, or in
    /// a room that is not listed, do not appear. A room listed twice gets the
    /// same intervals in both rows.
    pub fn occupancy<'r>(
        &self,
        date: NaiveDate,
        rooms: &'r [Room],
        entries: &[TimetableEntry],
    ) -> Vec<RoomOccupancy<'r>> {
        let mut by_room: HashMap<&str, Vec<Interval>> = HashMap::new();
        for session in self.resolver.effective_on(date, entries.iter()) {
            if let Some(room) = session.room() {
                by_room
                    .entry(room)
                    .or_default()
                    .push(Interval::from_entry(session));
            }
        }

        rooms
            .iter()
            .map(|room| RoomOccupancy {
                room,
                intervals: by_room.get(room.id.as_str()).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Rooms with nothing booked inside `window` on `date`.
    pub fn free_rooms<'r>(
        &self,
        date: NaiveDate,
        window: &TimeWindow,
        rooms: &'r [Room],
        entries: &[TimetableEntry],
    ) -> Vec<&'r Room> {
        self.occupancy(date, rooms, entries)
            .into_iter()
            .filter(|o| o.is_free_during(window))
            .map(|o| o.room)
            .collect()
    }

    /// Hour-by-hour grid covering `first_hour..last_hour` (exclusive end).
    pub fn hourly_grid<'r>(
        &self,
        date: NaiveDate,
        rooms: &'r [Room],
        entries: &[TimetableEntry],
        first_hour: u32,
        last_hour: u32,
    ) -> OccupancyGrid<'r> {
        let hours: Vec<u32> = (first_hour..last_hour.min(24)).collect();
        let rows = self
            .occupancy(date, rooms, entries)
            .into_iter()
            .map(|o| GridRow {
                room: o.room,
                cells: hours
                    .iter()
                    .filter_map(|&hour| {
                        let slot = hour_slot(hour)?;
                        Some(GridCell {
                            hour,
                            sessions: o
                                .intervals
                                .iter()
                                .filter(|i| i.window().overlaps(&slot))
                                .cloned()
                                .collect(),
                        })
                    })
                    .collect(),
            })
            .collect();

        OccupancyGrid { date, hours, rows }
    }
}
