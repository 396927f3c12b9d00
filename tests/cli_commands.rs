// Tests for argument parsing and command output against a temporary data dir.
use chrono::{NaiveDate, Weekday};
use std::fs;
use tutorgrid::cli::{self, Command};
use tutorgrid::config::Config;
use tutorgrid::context::TestContext;
use tutorgrid::model::{EventType, Room, Subject, TimeWindow, TimetableEntry};
use tutorgrid::storage::LocalStorage;
use tutorgrid::store::TimetableStore;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn w(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

fn wed() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
}

fn sample() -> TimetableStore {
    let mut store = TimetableStore::new();
    store.upsert_room(Room::new("a", "Room A")).unwrap();
    store.upsert_room(Room::new("b", "Room B")).unwrap();
    store.upsert_subject(Subject {
        id: "math".to_string(),
        name: "Mathematics".to_string(),
    });
    store
        .create_entry(
            TimetableEntry::regular("8", "math", "f1", Weekday::Wed, w("09:00", "10:00"))
                .with_id("regular")
                .in_room("a"),
        )
        .unwrap();
    store
        .create_entry(
            TimetableEntry::regular("9", "math", "f1", Weekday::Wed, w("09:30", "10:30"))
                .with_id("clash")
                .in_room("a"),
        )
        .unwrap();
    store
}

#[test]
fn test_parse_flags_and_commands() {
    let inv = cli::parse_args(&args(&[
        "--class", "8", "--division", "8A", "--json", "day", "2026-10-21",
    ]))
    .unwrap();
    assert_eq!(inv.command, Command::Day(wed()));
    assert_eq!(inv.filter.class.as_deref(), Some("8"));
    assert_eq!(inv.filter.division_id.as_deref(), Some("8A"));
    assert!(inv.json);
    assert!(!inv.verbose);

    let inv = cli::parse_args(&args(&["free", "2026-10-21", "14:00", "15:00"])).unwrap();
    assert_eq!(inv.command, Command::Free(wed(), w("14:00", "15:00")));

    let inv = cli::parse_args(&args(&["check", "2026-10-21"])).unwrap();
    assert_eq!(
        inv.command,
        Command::Check {
            from: wed(),
            days: 7
        }
    );
    let inv = cli::parse_args(&args(&["--days", "3", "check", "2026-10-21"])).unwrap();
    assert_eq!(
        inv.command,
        Command::Check {
            from: wed(),
            days: 3
        }
    );

    let inv = cli::parse_args(&args(&["--week-start", "sunday", "week", "2026-10-21"])).unwrap();
    assert_eq!(inv.week_start, Some(Weekday::Sun));
    assert_eq!(inv.command, Command::Week(wed()));
    assert!(cli::parse_args(&args(&["--week-start", "someday", "week", "2026-10-21"])).is_err());

    assert_eq!(cli::parse_args(&[]).unwrap().command, Command::Help);
    assert_eq!(
        cli::parse_args(&args(&["day", "2026-10-21", "--help"]))
            .unwrap()
            .command,
        Command::Help
    );
}

#[test]
fn test_parse_rejects_bad_input() {
    assert!(cli::parse_args(&args(&["day", "21/10/2026"])).is_err());
    assert!(cli::parse_args(&args(&["free", "2026-10-21", "15:00", "14:00"])).is_err());
    assert!(cli::parse_args(&args(&["--class"])).is_err());
    assert!(cli::parse_args(&args(&["--bogus", "export"])).is_err());
    assert!(cli::parse_args(&args(&["teleport"])).is_err());
    assert!(cli::parse_args(&args(&["--days", "366", "check", "2026-10-21"])).is_ok());
    assert!(cli::parse_args(&args(&["--days", "4000000000", "check", "2026-10-21"])).is_err());
}

#[test]
fn test_day_and_check_output() {
    let ctx = TestContext::new();
    LocalStorage::save(&ctx, &sample()).unwrap();
    let config = Config::default();

    let inv = cli::parse_args(&args(&["day", "2026-10-21"])).unwrap();
    let out = cli::run(&inv, &ctx, &config).unwrap();
    assert!(out.contains("Mathematics"));
    assert!(out.contains("Room A"));
    assert!(out.contains("09:00-10:00"));

    let inv = cli::parse_args(&args(&["check", "2026-10-19"])).unwrap();
    let out = cli::run(&inv, &ctx, &config).unwrap();
    assert!(out.contains("regular"));
    assert!(out.contains("clash"));
    assert!(out.contains("09:30-10:00"));

    let inv = cli::parse_args(&args(&["--days", "2", "check", "2026-10-19"])).unwrap();
    let out = cli::run(&inv, &ctx, &config).unwrap();
    assert!(out.starts_with("No double bookings"));
}

#[test]
fn test_free_rooms_json() {
    let ctx = TestContext::new();
    LocalStorage::save(&ctx, &sample()).unwrap();

    let inv = cli::parse_args(&args(&["--json", "free", "2026-10-21", "09:45", "10:15"])).unwrap();
    let out = cli::run(&inv, &ctx, &Config::default()).unwrap();
    let rooms: Vec<Room> = serde_json::from_str(&out).unwrap();
    assert_eq!(rooms, vec![Room::new("b", "Room B")]);
}

#[test]
fn test_import_then_export() {
    let ctx = TestContext::new();
    let mut incoming = sample();
    incoming
        .create_entry(
            TimetableEntry::special(
                "8",
                "math",
                "f1",
                wed(),
                EventType::Exam,
                w("09:00", "10:00"),
            )
            .with_id("exam")
            .in_room("b"),
        )
        .unwrap();
    let source = ctx.root.join("incoming.json");
    fs::write(&source, serde_json::to_string(&incoming).unwrap()).unwrap();

    let inv = cli::Invocation {
        command: Command::Import(source.clone()),
        ..cli::parse_args(&[]).unwrap()
    };
    let out = cli::run(&inv, &ctx, &Config::default()).unwrap();
    assert!(out.starts_with("Imported 3 entries, 2 rooms"));
    assert_eq!(LocalStorage::load(&ctx).unwrap(), incoming);

    let inv = cli::parse_args(&args(&["export"])).unwrap();
    let exported: TimetableStore =
        serde_json::from_str(&cli::run(&inv, &ctx, &Config::default()).unwrap()).unwrap();
    assert_eq!(exported, incoming);

    // The exam moves class 8 to room B, so room A has only class 9 left.
    let inv = cli::parse_args(&args(&["--json", "week", "2026-10-21"])).unwrap();
    let week: serde_json::Value =
        serde_json::from_str(&cli::run(&inv, &ctx, &Config::default()).unwrap()).unwrap();
    let days = week.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2026-10-19");
    let wednesday = days[2]["sessions"].as_array().unwrap();
    let ids: Vec<&str> = wednesday
        .iter()
        .map(|s| s["entryId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["exam", "clash"]);
}

#[test]
fn test_import_rejects_invalid_file() {
    let ctx = TestContext::new();
    LocalStorage::save(&ctx, &sample()).unwrap();

    let source = ctx.root.join("broken.json");
    fs::write(
        &source,
        r#"{"entries":[{"id":"x","class":"8","subjectId":"m","facultyId":"f",
            "type":"Regular","dayOfWeek":3,"startTime":"10:00","endTime":"09:00"}]}"#,
    )
    .unwrap();

    let inv = cli::Invocation {
        command: Command::Import(source),
        ..cli::parse_args(&[]).unwrap()
    };
    assert!(cli::run(&inv, &ctx, &Config::default()).is_err());
    assert_eq!(LocalStorage::load(&ctx).unwrap(), sample());
}

#[test]
fn test_help_lists_override_rules() {
    let help = cli::help_text("tutorgrid");
    assert!(help.contains("USAGE:"));
    assert!(help.contains("ClassAndTime"));
    assert!(help.contains("ClassSubjectAndTime"));
}

#[test]
fn test_init_writes_default_config_once() {
    let ctx = TestContext::new();
    let inv = cli::parse_args(&args(&["init"])).unwrap();
    assert_eq!(inv.command, Command::InitConfig);

    let config = Config {
        grid_first_hour: 7,
        ..Config::default()
    };
    let out = cli::run(&inv, &ctx, &config).unwrap();
    assert!(out.starts_with("Wrote"));
    assert_eq!(Config::load(&ctx).unwrap(), config);

    let again = cli::run(&inv, &ctx, &Config::default()).unwrap();
    assert!(again.starts_with("Config already exists"));
    assert_eq!(Config::load(&ctx).unwrap().grid_first_hour, 7);
}
