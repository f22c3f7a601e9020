use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{format_timestamp, format_week, parse_date, parse_timestamp};
use crate::error::CoreError;
use crate::table::{HeaderIndex, Table};

// ---------------------------------------------------------------------------
// Cell booleans
// ---------------------------------------------------------------------------

/// Checkbox cells: `TRUE`/`FALSE` in any case, or a tick/cross.
pub fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") || s == "✔" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "✘" {
        Some(false)
    } else {
        None
    }
}

pub fn render_bool(b: Option<bool>) -> String {
    match b {
        Some(true) => "TRUE".into(),
        Some(false) => "FALSE".into(),
        None => String::new(),
    }
}

fn flag(idx: &HeaderIndex, row: &[String], column: &str) -> bool {
    parse_bool(idx.value(row, column)) == Some(true)
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// One scheduled slot in a week. Derived `Ord` is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Session {
    Tues,
    Thurs,
    Sat,
}

impl Session {
    pub const ALL: [Session; 3] = [Session::Tues, Session::Thurs, Session::Sat];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Tues => "Tues",
            Self::Thurs => "Thurs",
            Self::Sat => "Sat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tues" | "tue" | "tuesday" => Some(Self::Tues),
            "thurs" | "thu" | "thursday" => Some(Self::Thurs),
            "sat" | "saturday" => Some(Self::Sat),
            _ => None,
        }
    }

    /// Days after the week-commencing Monday.
    pub fn day_offset(&self) -> i64 {
        match self {
            Self::Tues => 1,
            Self::Thurs => 3,
            Self::Sat => 5,
        }
    }

    pub fn is_training(&self) -> bool {
        !matches!(self, Self::Sat)
    }

    /// Training session falling on `date` relative to its Monday, if any.
    pub fn training_on(week_commencing: NaiveDate, date: NaiveDate) -> Option<Self> {
        match (date - week_commencing).num_days() {
            1 => Some(Self::Tues),
            3 => Some(Self::Thurs),
            _ => None,
        }
    }

    /// Ledger sort key: the label sorts alphabetically, so Sat < Thurs < Tues.
    pub fn label_order(&self) -> &'static str {
        self.label()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The sessions actually held in a schedule week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSet {
    tues: bool,
    thurs: bool,
    sat: bool,
}

impl SessionSet {
    pub fn contains(&self, session: Session) -> bool {
        match session {
            Session::Tues => self.tues,
            Session::Thurs => self.thurs,
            Session::Sat => self.sat,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.tues || self.thurs || self.sat)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Chronological order.
    pub fn iter(&self) -> impl Iterator<Item = Session> + '_ {
        Session::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

pub const SCHEDULE_COLUMNS: &[&str] = &["#", "Week commencing", "Tues", "Thurs", "Match Date", "1st", "2nd"];
pub const WEEK_LABEL_COLUMN: &str = "Week Label";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWeek {
    pub number: u32,
    pub week_commencing: NaiveDate,
    pub match_date: Option<NaiveDate>,
    pub tues: bool,
    pub thurs: bool,
    pub first_fixture: String,
    pub second_fixture: String,
    pub label: String,
}

impl ScheduleWeek {
    /// Sessions held this week. The only place this derivation lives:
    /// Tues/Thurs from their flags, Sat when either team has a fixture.
    pub fn sessions(&self) -> SessionSet {
        SessionSet {
            tues: self.tues,
            thurs: self.thurs,
            sat: self.has_fixture(),
        }
    }

    pub fn has_fixture(&self) -> bool {
        !self.first_fixture.is_empty() || !self.second_fixture.is_empty()
    }

    pub fn session_date(&self, session: Session) -> NaiveDate {
        match (session, self.match_date) {
            (Session::Sat, Some(d)) => d,
            _ => self.week_commencing + Duration::days(session.day_offset()),
        }
    }

    /// Saturday match date, or the Saturday of the week when none is set.
    pub fn effective_match_date(&self) -> NaiveDate {
        self.session_date(Session::Sat)
    }

    /// `1s v A<sep>2s v B`, or whichever side is set.
    pub fn fixtures_text(&self, sep: &str) -> String {
        match (self.first_fixture.as_str(), self.second_fixture.as_str()) {
            ("", "") => String::new(),
            (a, "") => format!("1s v {a}"),
            ("", b) => format!("2s v {b}"),
            (a, b) => format!("1s v {a}{sep}2s v {b}"),
        }
    }

    /// Parse every usable row; rows without a week number or date are skipped.
    pub fn parse_table(sheet: &str, table: &Table) -> Result<Vec<ScheduleWeek>, CoreError> {
        let idx = table.index(sheet, SCHEDULE_COLUMNS)?;
        let mut weeks = Vec::new();
        for (i, row) in table.data_rows().iter().enumerate() {
            let number = match idx.value(row, "#").parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    log::debug!("{sheet} row {}: no week number, skipped", i + 2);
                    continue;
                }
            };
            let Some(week_commencing) = parse_date(idx.value(row, "Week commencing")) else {
                log::debug!("{sheet} row {}: no week commencing date, skipped", i + 2);
                continue;
            };
            weeks.push(ScheduleWeek {
                number,
                week_commencing,
                match_date: parse_date(idx.value(row, "Match Date")),
                tues: flag(&idx, row, "Tues"),
                thurs: flag(&idx, row, "Thurs"),
                first_fixture: idx.value(row, "1st").to_string(),
                second_fixture: idx.value(row, "2nd").to_string(),
                label: idx.value(row, WEEK_LABEL_COLUMN).to_string(),
            });
        }
        Ok(weeks)
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Player {
    pub name: String,
    pub phone: String,
    pub positions: Vec<String>,
    pub primary_position: String,
    pub first: bool,
    pub second: bool,
    pub colts: bool,
    pub injured: bool,
    pub unavailable: bool,
}

impl Player {
    /// Shown on the private roster board and the selection sheet.
    pub fn is_selectable(&self) -> bool {
        !self.colts && !self.unavailable
    }

    pub fn parse_table(sheet: &str, table: &Table) -> Result<Vec<Player>, CoreError> {
        let idx = table.index(sheet, &["Name"])?;
        Ok(table
            .data_rows()
            .iter()
            .filter_map(|row| {
                let name = idx.value(row, "Name");
                if name.is_empty() {
                    return None;
                }
                Some(Player {
                    name: name.to_string(),
                    phone: idx.value(row, "Phone").to_string(),
                    positions: split_positions(idx.value(row, "Positions")),
                    primary_position: idx.value(row, "Primary Position").to_string(),
                    first: flag(&idx, row, "1st"),
                    second: flag(&idx, row, "2nd"),
                    colts: flag(&idx, row, "Colts"),
                    injured: flag(&idx, row, "Injured"),
                    unavailable: flag(&idx, row, "Unavailable"),
                })
            })
            .collect())
    }
}

pub fn split_positions(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Ledger (AvailabilityLatest)
// ---------------------------------------------------------------------------

pub const LEDGER_HEADERS: &[&str] = &[
    "Name",
    "#",
    "Week commencing",
    "Event",
    "Date",
    "Available",
    "Attended",
    "Last updated",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    pub name: String,
    pub week: u32,
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub name: String,
    pub week: u32,
    pub week_commencing: Option<NaiveDate>,
    pub session: Session,
    pub date: Option<NaiveDate>,
    pub available: Option<bool>,
    pub attended: Option<bool>,
    pub last_updated: Option<NaiveDateTime>,
}

impl LedgerRow {
    pub fn key(&self) -> LedgerKey {
        LedgerKey {
            name: self.name.clone(),
            week: self.week,
            session: self.session,
        }
    }

    /// None when the row lacks a name, week number or session.
    pub fn from_row(idx: &HeaderIndex, row: &[String]) -> Option<LedgerRow> {
        let name = idx.value(row, "Name");
        if name.is_empty() {
            return None;
        }
        Some(LedgerRow {
            name: name.to_string(),
            week: idx.value(row, "#").parse().ok()?,
            week_commencing: parse_date(idx.value(row, "Week commencing")),
            session: Session::parse(idx.value(row, "Event"))?,
            date: parse_date(idx.value(row, "Date")),
            available: parse_bool(idx.value(row, "Available")),
            attended: parse_bool(idx.value(row, "Attended")),
            last_updated: parse_timestamp(idx.value(row, "Last updated")),
        })
    }

    /// Rendered value for a ledger column; `None` for columns the ledger doesn't own.
    pub fn render_field(&self, header: &str) -> Option<String> {
        let value = match header.trim() {
            "Name" => self.name.clone(),
            "#" => self.week.to_string(),
            "Week commencing" => self.week_commencing.map(format_week).unwrap_or_default(),
            "Event" => self.session.label().to_string(),
            "Date" => self.date.map(format_week).unwrap_or_default(),
            "Available" => render_bool(self.available),
            "Attended" => render_bool(self.attended),
            "Last updated" => self.last_updated.map(format_timestamp).unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Cells in the order of the sheet's own header row.
    pub fn render(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.render_field(h).unwrap_or_default())
            .collect()
    }

    /// Ledger rows that parse; rows missing a key are left out.
    pub fn parse_table(sheet: &str, table: &Table) -> Result<Vec<LedgerRow>, CoreError> {
        let idx = table.index(sheet, &["Name", "#", "Event", "Available", "Attended"])?;
        Ok(table
            .data_rows()
            .iter()
            .filter_map(|row| LedgerRow::from_row(&idx, row))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Attendance history
// ---------------------------------------------------------------------------

pub const ATTENDANCE_HEADERS: &[&str] = &[
    "#",
    "Week commencing",
    "Name",
    "Session",
    "Attended",
    "Date",
    "Last updated",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttendanceKey {
    pub name: String,
    pub week_commencing: NaiveDate,
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub week: Option<u32>,
    pub week_commencing: NaiveDate,
    pub name: String,
    pub session: Session,
    pub attended: Option<bool>,
    pub date: Option<NaiveDate>,
    pub last_updated: Option<NaiveDateTime>,
}

impl AttendanceEntry {
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey {
            name: self.name.clone(),
            week_commencing: self.week_commencing,
            session: self.session,
        }
    }

    pub fn from_row(idx: &HeaderIndex, row: &[String]) -> Option<AttendanceEntry> {
        let name = idx.value(row, "Name");
        if name.is_empty() {
            return None;
        }
        Some(AttendanceEntry {
            week: idx.value(row, "#").parse().ok(),
            week_commencing: parse_date(idx.value(row, "Week commencing"))?,
            name: name.to_string(),
            session: Session::parse(idx.value(row, "Session"))?,
            attended: parse_bool(idx.value(row, "Attended")),
            date: parse_date(idx.value(row, "Date")),
            last_updated: parse_timestamp(idx.value(row, "Last updated")),
        })
    }

    pub fn render_field(&self, header: &str) -> Option<String> {
        let value = match header.trim() {
            "#" => self.week.map(|w| w.to_string()).unwrap_or_default(),
            "Week commencing" => format_week(self.week_commencing),
            "Name" => self.name.clone(),
            "Session" => self.session.label().to_string(),
            "Attended" => render_bool(self.attended),
            "Date" => self.date.map(crate::dates::format_iso).unwrap_or_default(),
            "Last updated" => self.last_updated.map(format_timestamp).unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    pub fn render(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.render_field(h).unwrap_or_default())
            .collect()
    }

    pub fn parse_table(sheet: &str, table: &Table) -> Result<Vec<AttendanceEntry>, CoreError> {
        let idx = table.index(sheet, &["Name", "Week commencing", "Session", "Attended"])?;
        Ok(table
            .data_rows()
            .iter()
            .filter_map(|row| AttendanceEntry::from_row(&idx, row))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Form submissions
// ---------------------------------------------------------------------------

pub const FORM_TIMESTAMP: &str = "Timestamp";
pub const FORM_NAME: &str = "Name";
pub const FORM_WEEK: &str = "Week commencing";
pub const FORM_SELECTION: &str = "Select your training attendance / match day availability";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionKey {
    pub name: String,
    pub week_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub week_label: String,
    pub selection: String,
}

impl FormSubmission {
    pub fn key(&self) -> SubmissionKey {
        SubmissionKey {
            name: self.name.clone(),
            week_label: self.week_label.clone(),
        }
    }

    /// Whether the free-text selection ticks `session`.
    pub fn declares(&self, session: Session) -> bool {
        let s = self.selection.to_lowercase();
        match session {
            Session::Tues => s.contains("tuesday"),
            Session::Thurs => s.contains("thursday"),
            Session::Sat => s.contains("saturday") || s.contains("match"),
        }
    }
}
