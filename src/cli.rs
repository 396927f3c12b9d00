// File: ./src/cli.rs
//! Command-line parsing and rendering shared by the `tutorgrid` binary.

use crate::config::Config;
use crate::conflict::ConflictDetector;
use crate::context::AppContext;
use crate::model::TimeWindow;
use crate::model::time::{format_time, parse_weekday};
use crate::occupancy::{OccupancyEngine, OccupancyGrid};
use crate::resolver::{OverrideMatch, ScheduleFilter, ScheduleResolver};
use crate::storage::LocalStorage;
use crate::store::{Directory, TimetableStore};
use crate::views::{self, DayView};
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Weekday};
use std::fmt::Write as _;
use std::path::PathBuf;
use strum::IntoEnumIterator;

/// Longest range `check` audits in one run.
pub const MAX_CHECK_DAYS: u32 = 366;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Day(NaiveDate),
    Tomorrow(NaiveDate),
    Week(NaiveDate),
    Free(NaiveDate, TimeWindow),
    Grid(NaiveDate),
    Check { from: NaiveDate, days: u32 },
    Import(PathBuf),
    Export,
    InitConfig,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub json: bool,
    /// Overrides `week_starts_on` from the config for this run.
    pub week_start: Option<Weekday>,
    pub filter: ScheduleFilter,
    pub command: Command,
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parses everything after the binary name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut root = None;
    let mut verbose = false;
    let mut json = false;
    let mut week_start = None;
    let mut filter = ScheduleFilter::all();
    let mut days = 7u32;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value_of = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{} needs a value", flag))
        };
        match arg.as_str() {
            "-r" | "--root" => root = Some(PathBuf::from(value_of(arg.as_str())?)),
            "-v" | "--verbose" => verbose = true,
            "--json" => json = true,
            "--class" => filter.class = Some(value_of(arg.as_str())?),
            "--division" => filter.division_id = Some(value_of(arg.as_str())?),
            "--week-start" => {
                let raw = value_of(arg.as_str())?;
                week_start = Some(
                    parse_weekday(&raw).with_context(|| format!("invalid weekday '{}'", raw))?,
                );
            }
            "--days" => {
                let raw = value_of(arg.as_str())?;
                days = raw
                    .parse()
                    .with_context(|| format!("invalid day count '{}'", raw))?;
                if days > MAX_CHECK_DAYS {
                    bail!("--days is limited to {}", MAX_CHECK_DAYS);
                }
            }
            "-h" | "--help" | "help" => positional.insert(0, "help"),
            other if other.starts_with('-') => bail!("unknown option '{}'", other),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        [] | ["help", ..] => Command::Help,
        ["day", date] => Command::Day(parse_date(date)?),
        ["tomorrow", date] => Command::Tomorrow(parse_date(date)?),
        ["week", date] => Command::Week(parse_date(date)?),
        ["free", date, start, end] => {
            Command::Free(parse_date(date)?, TimeWindow::parse(start, end)?)
        }
        ["grid", date] => Command::Grid(parse_date(date)?),
        ["check", date] => Command::Check {
            from: parse_date(date)?,
            days,
        },
        ["import", path] => Command::Import(PathBuf::from(*path)),
        ["export"] => Command::Export,
        ["init"] => Command::InitConfig,
        [cmd, ..] => bail!("unknown or incomplete command '{}' (see --help)", cmd),
    };

    Ok(Invocation {
        root,
        verbose,
        json,
        week_start,
        filter,
        command,
    })
}

/// Executes a parsed command and returns what should be printed.
pub fn run(inv: &Invocation, ctx: &dyn AppContext, config: &Config) -> Result<String> {
    let resolver = ScheduleResolver::new(config.resolution_rules());

    // None of these reads the local snapshot; import must work even when
    // the current one is unreadable.
    match &inv.command {
        Command::Help => return Ok(help_text("tutorgrid")),
        Command::InitConfig => {
            let path = ctx.get_config_file_path()?;
            if path.exists() {
                return Ok(format!("Config already exists at {}\n", path.display()));
            }
            config.save(ctx)?;
            return Ok(format!("Wrote {}\n", path.display()));
        }
        Command::Import(path) => {
            let store = LocalStorage::import_file(ctx, path)?;
            return Ok(format!(
                "Imported {} entries, {} rooms from {}\n",
                store.entries.len(),
                store.rooms.len(),
                path.display()
            ));
        }
        _ => {}
    }

    let store = LocalStorage::load(ctx)?;
    let entries = &store.entries;

    let out = match &inv.command {
        Command::Help | Command::InitConfig | Command::Import(_) => String::new(),
        Command::Export => serde_json::to_string_pretty(&store)? + "\n",
        Command::Day(date) => {
            let view = views::day(&resolver, *date, entries, &inv.filter, &store);
            render_days(&[view], inv.json)?
        }
        Command::Tomorrow(reference) => {
            let view = views::tomorrow(&resolver, *reference, entries, &inv.filter, &store);
            render_days(&[view], inv.json)?
        }
        Command::Week(reference) => {
            let week = views::week(
                &resolver,
                *reference,
                inv.week_start.unwrap_or(config.week_starts_on),
                entries,
                &inv.filter,
                &store,
            );
            render_days(&week, inv.json)?
        }
        Command::Free(date, window) => {
            let engine = OccupancyEngine::new(resolver);
            let free = engine.free_rooms(*date, window, &store.rooms, entries);
            if inv.json {
                serde_json::to_string_pretty(&free)? + "\n"
            } else {
                let mut s = format!("Free rooms on {} {}:\n", date, window);
                for room in free {
                    let _ = writeln!(s, "  {}", room.name);
                }
                s
            }
        }
        Command::Grid(date) => {
            let (first, last) = config.grid_hours();
            let engine = OccupancyEngine::new(resolver);
            let grid = engine.hourly_grid(*date, &store.rooms, entries, first, last);
            if inv.json {
                serde_json::to_string_pretty(&grid)? + "\n"
            } else {
                render_grid(&grid)
            }
        }
        Command::Check { from, days } => {
            let detector = ConflictDetector::new(resolver);
            let found = detector.audit_range(*from, *days, entries);
            let mut s = String::new();
            if found.is_empty() {
                let _ = writeln!(s, "No double bookings in {} day(s) from {}", days, from);
            }
            for clash in &found {
                let _ = writeln!(
                    s,
                    "{} {}: {} ({}) overlaps {} ({}) during {}",
                    clash.date,
                    room_label(&store, clash.room_id()),
                    clash.first.id,
                    clash.first.window(),
                    clash.second.id,
                    clash.second.window(),
                    clash.overlap
                );
            }
            s
        }
    };
    Ok(out)
}

fn room_label(store: &TimetableStore, room_id: &str) -> String {
    store
        .room(room_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| format!("room {}", room_id))
}

fn render_days(days: &[DayView], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(days)? + "\n");
    }
    let mut s = String::new();
    for day in days {
        let _ = writeln!(s, "{} ({})", day.date, day.date.format("%a"));
        if day.sessions.is_empty() {
            let _ = writeln!(s, "  (no sessions)");
        }
        for session in &day.sessions {
            let _ = write!(
                s,
                "  {}-{}  {:<6} {:<16} {:<16} {}",
                format_time(session.start),
                format_time(session.end),
                session.class,
                session.subject.as_deref().unwrap_or("-"),
                session.faculty.as_deref().unwrap_or("-"),
                session
                    .room
                    .as_deref()
                    .or(session.room_id.as_deref())
                    .unwrap_or("-"),
            );
            if let Some(kind) = &session.event_type {
                let _ = write!(s, "  [{}]", kind);
            }
            s.push('\n');
        }
    }
    Ok(s)
}

fn render_grid(grid: &OccupancyGrid<'_>) -> String {
    let width = grid
        .rows
        .iter()
        .map(|r| r.room.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let mut s = format!(
        "{} ({})\n{:width$} ",
        grid.date,
        grid.date.format("%a"),
        "",
        width = width
    );
    for hour in &grid.hours {
        let _ = write!(s, " {:02}", hour);
    }
    s.push('\n');
    for row in &grid.rows {
        let _ = write!(s, "{:width$} ", row.room.name, width = width);
        for cell in &row.cells {
            s.push_str(if cell.is_free() { "  ." } else { "  #" });
        }
        s.push('\n');
    }
    s
}

pub fn help_text(binary_name: &str) -> String {
    let mut s = String::new();
    let _ = writeln!(
        s,
        "Tutorgrid v{} - timetable resolution and room conflicts",
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(s);
    let _ = writeln!(s, "USAGE:");
    let _ = writeln!(s, "    {} [OPTIONS] <COMMAND>", binary_name);
    let _ = writeln!(s);
    let _ = writeln!(s, "COMMANDS:");
    let _ = writeln!(s, "    day <date>                 Sessions on a date");
    let _ = writeln!(s, "    tomorrow <date>            Sessions on the day after <date>");
    let _ = writeln!(s, "    week <date>                The week containing <date>");
    let _ = writeln!(s, "    free <date> <start> <end>  Rooms free for the whole window");
    let _ = writeln!(s, "    grid <date>                Hourly room occupancy grid");
    let _ = writeln!(s, "    check <date> [--days N]    Double bookings from <date> (7 days)");
    let _ = writeln!(s, "    import <file.json>         Replace the local timetable");
    let _ = writeln!(s, "    export                     Print the local timetable as JSON");
    let _ = writeln!(s, "    init                       Write a default config.toml");
    let _ = writeln!(s);
    let _ = writeln!(s, "OPTIONS:");
    let _ = writeln!(s, "    -r, --root <path>     Directory for config and data");
    let _ = writeln!(s, "    --class <class>       Only this class (and school-wide sessions)");
    let _ = writeln!(s, "    --division <id>       Only this division (and whole-class sessions)");
    let _ = writeln!(s, "    --week-start <day>    First day of the week for 'week' (e.g. sun)");
    let _ = writeln!(s, "    --json                Machine-readable output");
    let _ = writeln!(s, "    -v, --verbose         Debug logging on stderr");
    let _ = writeln!(s, "    -h, --help            Show this help message.");
    let _ = writeln!(s);
    let _ = writeln!(s, "CONFIG (config.toml):");
    let _ = writeln!(s, "    override_match        Which specials replace a regular slot:");
    for rule in OverrideMatch::iter() {
        let _ = writeln!(s, "        {:<22} {}", format!("{:?}", rule), rule);
    }
    let _ = writeln!(s);
    let _ = writeln!(s, "Dates are YYYY-MM-DD, times HH:MM.");
    s
}
