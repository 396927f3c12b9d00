// File: ./src/resolver.rs
//! Effective-schedule resolution.
//!
//! A weekly `Regular` entry happens on every matching weekday unless a
//! `Special` entry for the same class overlaps it in time on that date, in
//! which case the special wins and the regular is suppressed for that date
//! only. Specials that overlap nothing are plain additions.
//!
//! Every screen (day, week, "tomorrow", room grid, edit dialog) goes through
//! [`ScheduleResolver`], so the override rule lives in exactly one place.

use crate::model::TimetableEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

pub const DEFAULT_WILDCARD_CLASS: &str = "All";

/// Which special entries are allowed to suppress a regular one.
///
/// Overlap on the same class is the canonical rule. Centers that only want a
/// special to replace the same subject can opt into `ClassSubjectAndTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter)]
pub enum OverrideMatch {
    #[default]
    ClassAndTime,
    ClassSubjectAndTime,
}

impl fmt::Display for OverrideMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideMatch::ClassAndTime => write!(f, "Class + time overlap"),
            OverrideMatch::ClassSubjectAndTime => write!(f, "Class + subject + time overlap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRules {
    /// Class marker matching every class (school-wide sessions).
    pub wildcard_class: String,
    pub override_match: OverrideMatch,
}

impl Default for ResolutionRules {
    fn default() -> Self {
        Self {
            wildcard_class: DEFAULT_WILDCARD_CLASS.to_string(),
            override_match: OverrideMatch::default(),
        }
    }
}

impl ResolutionRules {
    pub fn is_wildcard(&self, class: &str) -> bool {
        class.trim().eq_ignore_ascii_case(self.wildcard_class.trim())
    }
}

fn same_class(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Optional narrowing of a resolved day. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub class: Option<String>,
    pub division_id: Option<String>,
}

impl ScheduleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_class(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            division_id: None,
        }
    }

    pub fn division(mut self, division_id: &str) -> Self {
        self.division_id = Some(division_id.to_string());
        self
    }
}

/// A regular entry knocked out for one date, and the special that did it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suppression<'a> {
    pub regular: &'a TimetableEntry,
    pub by: &'a TimetableEntry,
}

/// Full outcome of resolving one date, before any view filter is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub date: NaiveDate,
    /// Effective sessions sorted by start time, ties in collection order.
    pub sessions: Vec<&'a TimetableEntry>,
    pub suppressed: Vec<Suppression<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleResolver {
    rules: ResolutionRules,
}

impl ScheduleResolver {
    pub fn new(rules: ResolutionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ResolutionRules {
        &self.rules
    }

    /// Effective sessions on `date`, narrowed by `filter`.
    ///
    /// Overrides are decided against every special of the date, not only the
    /// ones the filter keeps, so a filtered view is always a subset of the
    /// unfiltered one.
    pub fn resolve<'a>(
        &self,
        date: NaiveDate,
        entries: &'a [TimetableEntry],
        filter: &ScheduleFilter,
    ) -> Vec<&'a TimetableEntry> {
        self.resolve_detailed(date, entries.iter())
            .sessions
            .into_iter()
            .filter(|e| self.matches_filter(e, filter))
            .collect()
    }

    /// Unfiltered effective sessions over any borrowed collection.
    pub fn effective_on<'a, I>(&self, date: NaiveDate, entries: I) -> Vec<&'a TimetableEntry>
    where
        I: IntoIterator<Item = &'a TimetableEntry>,
    {
        self.resolve_detailed(date, entries).sessions
    }

    pub fn resolve_detailed<'a, I>(&self, date: NaiveDate, entries: I) -> Resolution<'a>
    where
        I: IntoIterator<Item = &'a TimetableEntry>,
    {
        let scheduled: Vec<&'a TimetableEntry> =
            entries.into_iter().filter(|e| e.falls_on(date)).collect();
        let specials: Vec<&'a TimetableEntry> =
            scheduled.iter().copied().filter(|e| e.is_special()).collect();

        let mut sessions = Vec::with_capacity(scheduled.len());
        let mut suppressed = Vec::new();

        for entry in scheduled {
            if entry.is_special() {
                sessions.push(entry);
                continue;
            }
            match specials.iter().copied().find(|s| self.overrides(s, entry)) {
                Some(by) => {
                    log::debug!(
                        "{}: regular {} ({} {}) suppressed by special {}",
                        date,
                        entry.id,
                        entry.class,
                        entry.window(),
                        by.id
                    );
                    suppressed.push(Suppression { regular: entry, by });
                }
                None => sessions.push(entry),
            }
        }

        // Stable sort: equal start times keep collection order.
        sessions.sort_by_key(|e| e.start_time);

        Resolution {
            date,
            sessions,
            suppressed,
        }
    }

    /// Whether `special` suppresses `regular` when both fall on the same date.
    pub fn overrides(&self, special: &TimetableEntry, regular: &TimetableEntry) -> bool {
        if !special.is_special() || regular.is_special() {
            return false;
        }
        let class_matches =
            same_class(&special.class, &regular.class) || self.rules.is_wildcard(&special.class);
        if !class_matches {
            return false;
        }
        if self.rules.override_match == OverrideMatch::ClassSubjectAndTime
            && special.subject_id != regular.subject_id
        {
            return false;
        }
        special.window().overlaps(&regular.window())
    }

    pub fn matches_filter(&self, entry: &TimetableEntry, filter: &ScheduleFilter) -> bool {
        if let Some(class) = filter.class.as_deref()
            && !self.rules.is_wildcard(class)
            && !same_class(&entry.class, class)
            && !self.rules.is_wildcard(&entry.class)
        {
            return false;
        }
        if let Some(division) = filter.division_id.as_deref()
            && let Some(own) = entry.division_id.as_deref()
            && own != division
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, TimeWindow};
    use chrono::Weekday;

    fn w(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(start, end).unwrap()
    }

    fn wed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    #[test]
    fn test_wildcard_special_overrides_every_class() {
        let resolver = ScheduleResolver::default();
        let regular = TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("09:00", "10:00"));
        let assembly =
            TimetableEntry::special("All", "s", "f", wed(), EventType::Exam, w("09:30", "11:00"));
        assert!(resolver.overrides(&assembly, &regular));

        // ...but a class special does not knock out a school-wide regular.
        let school_wide =
            TimetableEntry::regular("all", "s", "f", Weekday::Wed, w("09:00", "10:00"));
        let class_special =
            TimetableEntry::special("8", "s", "f", wed(), EventType::Exam, w("09:00", "10:00"));
        assert!(!resolver.overrides(&class_special, &school_wide));
    }

    #[test]
    fn test_subject_policy_requires_same_subject() {
        let resolver = ScheduleResolver::new(ResolutionRules {
            override_match: OverrideMatch::ClassSubjectAndTime,
            ..ResolutionRules::default()
        });
        let regular = TimetableEntry::regular("8", "math", "f", Weekday::Wed, w("09:00", "10:00"));
        let other_subject =
            TimetableEntry::special("8", "phys", "f", wed(), EventType::Exam, w("09:00", "10:00"));
        let same_subject =
            TimetableEntry::special("8", "math", "f", wed(), EventType::Exam, w("09:00", "10:00"));
        assert!(!resolver.overrides(&other_subject, &regular));
        assert!(resolver.overrides(&same_subject, &regular));
    }

    #[test]
    fn test_filter_rules() {
        let resolver = ScheduleResolver::default();
        let whole_class = TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("09:00", "10:00"));
        let div_a = whole_class.clone().for_division("8A");
        let school = TimetableEntry::regular("All", "s", "f", Weekday::Wed, w("09:00", "10:00"));

        let class_8 = ScheduleFilter::for_class("8");
        let class_9 = ScheduleFilter::for_class("9");
        let div_b = ScheduleFilter::for_class("8").division("8B");

        assert!(resolver.matches_filter(&whole_class, &class_8));
        assert!(!resolver.matches_filter(&whole_class, &class_9));
        assert!(resolver.matches_filter(&school, &class_9));
        assert!(resolver.matches_filter(&whole_class, &div_b));
        assert!(!resolver.matches_filter(&div_a, &div_b));
        assert!(resolver.matches_filter(&div_a, &ScheduleFilter::for_class("All")));
    }
}
