// Tests for room occupancy, free-room search and the hourly grid.
use chrono::{NaiveDate, Weekday};
use tutorgrid::model::{EventType, Room, TimeWindow, TimetableEntry};
use tutorgrid::occupancy::OccupancyEngine;

fn w(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

fn wed() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
}

fn rooms() -> Vec<Room> {
    vec![
        Room::new("a", "Room A"),
        Room::new("b", "Room B"),
        Room::new("c", "Room C"),
    ]
}

fn names(rooms: &[&Room]) -> Vec<String> {
    rooms.iter().map(|r| r.name.clone()).collect()
}

#[test]
fn test_short_session_blocks_whole_window() {
    let rooms = rooms();
    let entries = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("14:30", "14:45")).in_room("c"),
    ];

    let free = OccupancyEngine::default().free_rooms(wed(), &w("14:00", "15:00"), &rooms, &entries);
    assert_eq!(names(&free), vec!["Room A", "Room B"]);
}

#[test]
fn test_free_rooms_shrink_as_entries_are_added() {
    let rooms = rooms();
    let engine = OccupancyEngine::default();
    let window = w("10:00", "12:00");
    let additions = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("08:00", "10:00")).in_room("a"),
        TimetableEntry::regular("9", "s", "f", Weekday::Wed, w("11:59", "13:00")).in_room("b"),
        TimetableEntry::regular("9", "s", "f", Weekday::Thu, w("10:00", "12:00")).in_room("c"),
        TimetableEntry::regular("10", "s", "f", Weekday::Wed, w("09:00", "10:30")).in_room("a"),
    ];

    let mut entries = Vec::new();
    let mut previous = engine.free_rooms(wed(), &window, &rooms, &entries).len();
    assert_eq!(previous, 3);
    for entry in additions {
        entries.push(entry);
        let now = engine.free_rooms(wed(), &window, &rooms, &entries).len();
        assert!(now <= previous);
        previous = now;
    }
    // a (10:30 overlap) and b (11:59 overlap) are taken; c is busy on Thursday only.
    assert_eq!(previous, 1);
}

#[test]
fn test_wider_window_never_frees_more_rooms() {
    let rooms = rooms();
    let entries = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("14:20", "14:40")).in_room("b"),
        TimetableEntry::regular("9", "s", "f", Weekday::Wed, w("14:50", "15:30")).in_room("c"),
    ];
    let engine = OccupancyEngine::default();
    let nested = [w("14:00", "14:15"), w("14:00", "14:30"), w("14:00", "15:00")];

    let free: Vec<Vec<String>> = nested
        .iter()
        .map(|window| names(&engine.free_rooms(wed(), window, &rooms, &entries)))
        .collect();
    assert_eq!(free[0], vec!["Room A", "Room B", "Room C"]);
    assert_eq!(free[1], vec!["Room A", "Room C"]);
    assert_eq!(free[2], vec!["Room A"]);
    for pair in free.windows(2) {
        assert!(pair[1].iter().all(|room| pair[0].contains(room)));
    }
}

#[test]
fn test_duplicate_room_listing_is_busy_in_every_row() {
    let rooms = vec![Room::new("a", "Room A"), Room::new("a", "Room A (annex)")];
    let entries = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("14:00", "15:00")).in_room("a"),
    ];
    let engine = OccupancyEngine::default();

    let occupancy = engine.occupancy(wed(), &rooms, &entries);
    assert_eq!(occupancy[0].intervals.len(), 1);
    assert_eq!(occupancy[1].intervals, occupancy[0].intervals);
    assert!(engine.free_rooms(wed(), &w("14:30", "14:45"), &rooms, &entries).is_empty());
}

#[test]
fn test_occupancy_follows_overrides() {
    let rooms = rooms();
    let entries = vec![
        TimetableEntry::regular("8", "math", "f1", Weekday::Wed, w("09:00", "10:00"))
            .with_id("regular")
            .in_room("a"),
        TimetableEntry::special("8", "math", "f1", wed(), EventType::Exam, w("09:00", "10:00"))
            .with_id("exam")
            .in_room("b"),
        // No room, and an unknown room: neither shows up anywhere.
        TimetableEntry::regular("9", "s", "f", Weekday::Wed, w("09:00", "10:00")),
        TimetableEntry::regular("9", "s", "f", Weekday::Wed, w("11:00", "12:00")).in_room("gone"),
    ];

    let occupancy = OccupancyEngine::default().occupancy(wed(), &rooms, &entries);
    assert_eq!(occupancy.len(), 3);
    assert!(occupancy[0].intervals.is_empty());
    assert_eq!(occupancy[1].room.id, "b");
    assert_eq!(occupancy[1].intervals.len(), 1);
    assert_eq!(occupancy[1].intervals[0].entry_id, "exam");
    assert!(occupancy[2].intervals.is_empty());
}

#[test]
fn test_hourly_grid_marks_touched_hours() {
    let rooms = rooms();
    let entries = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("09:30", "11:00"))
            .with_id("long")
            .in_room("a"),
    ];

    let grid = OccupancyEngine::default().hourly_grid(wed(), &rooms, &entries, 8, 12);
    assert_eq!(grid.hours, vec![8, 9, 10, 11]);
    assert_eq!(grid.rows.len(), 3);

    let busy: Vec<bool> = grid.rows[0].cells.iter().map(|c| !c.is_free()).collect();
    assert_eq!(busy, vec![false, true, true, false]);
    assert!(grid.rows[1].cells.iter().all(|c| c.is_free()));
    assert_eq!(grid.rows[0].cells[1].sessions[0].entry_id, "long");
}

#[test]
fn test_grid_reaches_end_of_day() {
    let rooms = vec![Room::new("a", "Room A")];
    let entries = vec![
        TimetableEntry::regular("8", "s", "f", Weekday::Wed, w("23:15", "23:45")).in_room("a"),
    ];

    let grid = OccupancyEngine::default().hourly_grid(wed(), &rooms, &entries, 22, 30);
    assert_eq!(grid.hours, vec![22, 23]);
    assert!(grid.rows[0].cells[0].is_free());
    assert!(!grid.rows[0].cells[1].is_free());
}
