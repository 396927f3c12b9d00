// File: ./src/model/mod.rs
pub mod entities;
pub mod entry;
pub mod error;
pub mod time;

pub use entities::{Division, Faculty, Room, Subject};
pub use entry::{EventType, Schedule, TimetableEntry};
pub use error::ValidationError;
pub use time::TimeWindow;
