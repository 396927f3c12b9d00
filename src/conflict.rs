// File: ./src/conflict.rs
//! Room double-booking detection.
//!
//! Conflicts are advisory: callers show the warning and let the user confirm.
//! Detection only ever looks at *effective* sessions, so an entry suppressed
//! by a special on the checked date is never reported, and the detector can
//! never disagree with the occupancy views about what is booked. A weekly
//! candidate is checked across enough weeks that a one-off special cannot
//! hide a clash that repeats every other week.

use crate::model::{Schedule, TimeWindow, TimetableEntry};
use crate::model::time::next_on_or_after;
use crate::resolver::ScheduleResolver;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// An existing entry that collides with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict<'a> {
    pub date: NaiveDate,
    pub existing: &'a TimetableEntry,
    pub overlap: TimeWindow,
}

/// Two effective sessions sharing a room at overlapping times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleBooking<'a> {
    pub date: NaiveDate,
    pub first: &'a TimetableEntry,
    pub second: &'a TimetableEntry,
    pub overlap: TimeWindow,
}

impl DoubleBooking<'_> {
    pub fn room_id(&self) -> &str {
        self.first.room().unwrap_or_default()
    }
}

fn overlap_of(a: &TimeWindow, b: &TimeWindow) -> TimeWindow {
    TimeWindow {
        start: a.start.max(b.start),
        end: a.end.min(b.end),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    resolver: ScheduleResolver,
}

impl ConflictDetector {
    pub fn new(resolver: ScheduleResolver) -> Self {
        Self { resolver }
    }

    /// The first date a candidate happens: its own date for a special, the
    /// first matching weekday on or after `reference_date` for a regular.
    pub fn occurrence_date(candidate: &TimetableEntry, reference_date: NaiveDate) -> NaiveDate {
        match &candidate.schedule {
            Schedule::Special { specific_date, .. } => *specific_date,
            Schedule::Regular { day_of_week } => next_on_or_after(reference_date, *day_of_week),
        }
    }

    /// Dates a candidate has to be checked on, ascending.
    ///
    /// A special is checked on its own date. A regular repeats every week, so
    /// it is checked on every stored special's date that lands on its weekday,
    /// plus `n + 1` consecutive weeks from its first occurrence, where `n` is
    /// the number of those special dates. At least one of those weeks has no
    /// special at all, which is where a plain weekly clash shows.
    pub fn check_dates(
        candidate: &TimetableEntry,
        entries: &[TimetableEntry],
        reference_date: NaiveDate,
    ) -> Vec<NaiveDate> {
        let first = Self::occurrence_date(candidate, reference_date);
        let Schedule::Regular { day_of_week } = &candidate.schedule else {
            return vec![first];
        };
        let day_of_week = *day_of_week;

        let mut dates: BTreeSet<NaiveDate> = entries
            .iter()
            .filter_map(TimetableEntry::specific_date)
            .filter(|d| *d >= first && d.weekday() == day_of_week)
            .collect();
        let weeks = dates.len() as i64 + 1;
        dates.extend(
            (0..weeks).map_while(|week| first.checked_add_signed(Duration::weeks(week))),
        );
        dates.into_iter().collect()
    }

    /// First conflicting entry, if any.
    pub fn has_conflict<'a>(
        &self,
        candidate: &TimetableEntry,
        entries: &'a [TimetableEntry],
        exclude_id: Option<&str>,
        reference_date: NaiveDate,
    ) -> Option<Conflict<'a>> {
        self.find_conflicts(candidate, entries, exclude_id, reference_date)
            .into_iter()
            .next()
    }

    /// Every entry that would share the candidate's room at an overlapping
    /// time on some date from [`check_dates`](Self::check_dates). Each
    /// colliding entry is reported once, on the earliest such date.
    ///
    /// `exclude_id` is the entry being edited; any stored copy carrying the
    /// candidate's own id is skipped as well.
    pub fn find_conflicts<'a>(
        &self,
        candidate: &TimetableEntry,
        entries: &'a [TimetableEntry],
        exclude_id: Option<&str>,
        reference_date: NaiveDate,
    ) -> Vec<Conflict<'a>> {
        if candidate.room().is_none() {
            return Vec::new();
        }
        let others: Vec<&'a TimetableEntry> = entries
            .iter()
            .filter(|e| e.id != candidate.id && Some(e.id.as_str()) != exclude_id)
            .collect();

        let mut found: Vec<Conflict<'a>> = Vec::new();
        for date in Self::check_dates(candidate, entries, reference_date) {
            for conflict in self.conflicts_on(date, candidate, &others) {
                if !found.iter().any(|c| c.existing.id == conflict.existing.id) {
                    found.push(conflict);
                }
            }
        }
        found
    }

    /// Effective sessions of `date` colliding with the candidate, in resolver
    /// order.
    pub fn conflicts_on<'a>(
        &self,
        date: NaiveDate,
        candidate: &TimetableEntry,
        others: &[&'a TimetableEntry],
    ) -> Vec<Conflict<'a>> {
        let Some(room) = candidate.room() else {
            return Vec::new();
        };
        if !candidate.falls_on(date) {
            return Vec::new();
        }
        let window = candidate.window();

        // The candidate takes part in the override rule like any stored entry.
        if !candidate.is_special()
            && let Some(by) = others
                .iter()
                .find(|s| s.falls_on(date) && self.resolver.overrides(s, candidate))
        {
            log::debug!(
                "candidate {} is suppressed on {} by special {}",
                candidate.id,
                date,
                by.id
            );
            return Vec::new();
        }

        self.resolver
            .effective_on(date, others.iter().copied())
            .into_iter()
            .filter(|e| !self.resolver.overrides(candidate, e))
            .filter(|e| e.room() == Some(room) && e.window().overlaps(&window))
            .map(|existing| Conflict {
                date,
                existing,
                overlap: overlap_of(&existing.window(), &window),
            })
            .collect()
    }

    /// Every double booking among the effective sessions of `date`.
    pub fn audit<'a>(
        &self,
        date: NaiveDate,
        entries: &'a [TimetableEntry],
    ) -> Vec<DoubleBooking<'a>> {
        let sessions = self.resolver.effective_on(date, entries.iter());

        let mut by_room: BTreeMap<&str, Vec<&'a TimetableEntry>> = BTreeMap::new();
        for session in sessions {
            if let Some(room) = session.room() {
                by_room.entry(room).or_default().push(session);
            }
        }

        let mut found = Vec::new();
        for booked in by_room.values() {
            for (i, first) in booked.iter().enumerate() {
                for second in &booked[i + 1..] {
                    if first.window().overlaps(&second.window()) {
                        found.push(DoubleBooking {
                            date,
                            first: *first,
                            second: *second,
                            overlap: overlap_of(&first.window(), &second.window()),
                        });
                    }
                }
            }
        }
        found
    }

    /// [`audit`](Self::audit) over `days` consecutive dates starting at `from`,
    /// stopping early at the end of the calendar.
    pub fn audit_range<'a>(
        &self,
        from: NaiveDate,
        days: u32,
        entries: &'a [TimetableEntry],
    ) -> Vec<DoubleBooking<'a>> {
        (0..i64::from(days))
            .map_while(|offset| from.checked_add_signed(Duration::days(offset)))
            .flat_map(|date| self.audit(date, entries))
            .collect()
    }
}
