// File: src/store.rs
// In-memory snapshot of the entity store: reference data plus timetable entries.
use crate::model::{Division, Faculty, Room, Subject, TimetableEntry, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Name lookups used when displaying sessions. Missing ids yield `None`;
/// a dangling reference is never an error.
pub trait Directory {
    fn room(&self, id: &str) -> Option<&Room>;
    fn subject(&self, id: &str) -> Option<&Subject>;
    fn faculty(&self, id: &str) -> Option<&Faculty>;
    fn division(&self, id: &str) -> Option<&Division>;
}

/// Confirmation echoed back for every accepted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "id")]
pub enum Change {
    Created(String),
    Updated(String),
    Deleted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("no timetable entry with id '{0}'")]
    UnknownEntry(String),
    #[error("no room with id '{0}'")]
    UnknownRoom(String),
    #[error("id '{0}' is already in use")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableStore {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    #[serde(default)]
    pub divisions: Vec<Division>,
    #[serde(default)]
    pub entries: Vec<TimetableEntry>,
}

impl TimetableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, id: &str) -> Option<&TimetableEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    // --- Timetable entries ---

    /// Validates and appends a new entry. A blank id is replaced by a fresh one.
    pub fn create_entry(&mut self, mut entry: TimetableEntry) -> Result<Change, StoreError> {
        entry.validate()?;
        if entry.id.trim().is_empty() {
            entry.id = Uuid::new_v4().to_string();
        }
        if self.entry(&entry.id).is_some() {
            return Err(StoreError::DuplicateId(entry.id));
        }
        let id = entry.id.clone();
        self.entries.push(entry);
        log::debug!("created timetable entry {}", id);
        Ok(Change::Created(id))
    }

    /// Replaces an existing entry in place, keeping its position in the collection.
    pub fn update_entry(&mut self, entry: TimetableEntry) -> Result<Change, StoreError> {
        entry.validate()?;
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| StoreError::UnknownEntry(entry.id.clone()))?;
        *slot = entry;
        Ok(Change::Updated(slot.id.clone()))
    }

    pub fn delete_entry(&mut self, id: &str) -> Result<Change, StoreError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::UnknownEntry(id.to_string()))?;
        self.entries.remove(idx);
        Ok(Change::Deleted(id.to_string()))
    }

    // --- Rooms ---

    pub fn upsert_room(&mut self, room: Room) -> Result<Change, StoreError> {
        room.validate()?;
        if let Some(existing) = self.rooms.iter_mut().find(|r| r.id == room.id) {
            *existing = room;
            return Ok(Change::Updated(existing.id.clone()));
        }
        let id = room.id.clone();
        self.rooms.push(room);
        Ok(Change::Created(id))
    }

    /// Removes a room. Entries still pointing at it keep the dangling id and
    /// simply show no room name.
    pub fn delete_room(&mut self, id: &str) -> Result<Change, StoreError> {
        let idx = self
            .rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::UnknownRoom(id.to_string()))?;
        self.rooms.remove(idx);
        Ok(Change::Deleted(id.to_string()))
    }

    // --- Reference data ---

    pub fn upsert_subject(&mut self, subject: Subject) {
        match self.subjects.iter_mut().find(|s| s.id == subject.id) {
            Some(existing) => *existing = subject,
            None => self.subjects.push(subject),
        }
    }

    pub fn upsert_faculty(&mut self, member: Faculty) {
        match self.faculty.iter_mut().find(|f| f.id == member.id) {
            Some(existing) => *existing = member,
            None => self.faculty.push(member),
        }
    }

    pub fn upsert_division(&mut self, division: Division) {
        match self.divisions.iter_mut().find(|d| d.id == division.id) {
            Some(existing) => *existing = division,
            None => self.divisions.push(division),
        }
    }

    /// Entries that would be rejected on create, with the reason. Used to vet
    /// snapshots coming from outside before they replace the local one.
    pub fn invalid_entries(&self) -> Vec<(&str, ValidationError)> {
        self.entries
            .iter()
            .filter_map(|e| e.validate().err().map(|err| (e.id.as_str(), err)))
            .collect()
    }
}

impl Directory for TimetableStore {
    fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    fn faculty(&self, id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == id)
    }

    fn division(&self, id: &str) -> Option<&Division> {
        self.divisions.iter().find(|d| d.id == id)
    }
}
