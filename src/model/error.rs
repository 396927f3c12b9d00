// File: ./src/model/error.rs
use thiserror::Error;

/// Reasons an entry (or a time window) is rejected before it ever reaches
/// resolution or conflict detection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("class is required")]
    MissingClass,
    #[error("subject is required")]
    MissingSubject,
    #[error("faculty is required")]
    MissingFaculty,
    #[error("end time {end} must be after start time {start}")]
    InvalidWindow { start: String, end: String },
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("day of week {0} is out of range (0 = Sunday .. 6 = Saturday)")]
    DayOutOfRange(u8),
    #[error("room name is required")]
    MissingRoomName,
}
