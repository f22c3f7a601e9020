//! The training register: who is expected at a session and who turned up.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use squadsheet_core::dates::{format_week, monday_of, parse_date};
use squadsheet_core::model::{parse_bool, render_bool};
use squadsheet_core::{CellRef, LedgerRow, Player, ScheduleWeek, Session, Table};

use crate::error::BoardError;

pub const DATE_CELL: CellRef = CellRef::new(0, 1); // B1
pub const SAVED_CELL: CellRef = CellRef::new(0, 4); // E1
const HEADER_ROW: usize = 2;
const FIRST_ROW: usize = 3;
const HEADERS: [&str; 3] = ["#", "Player", "Attended"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRow {
    pub name: String,
    pub available: bool,
    pub attended: bool,
    /// Attendance was already recorded for this player and session.
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSheet {
    pub date: NaiveDate,
    pub session: Session,
    pub rows: Vec<AttendanceRow>,
    pub previously_saved: bool,
    #[serde(skip)]
    capacity: usize,
}

impl AttendanceSheet {
    /// Players expected at the session on `date`: available, or already
    /// marked. Ledger names not on the roster are dropped.
    pub fn load(
        players: &[Player],
        ledger: &[LedgerRow],
        date: NaiveDate,
        capacity: usize,
    ) -> Result<Self, BoardError> {
        let week_commencing = monday_of(date);
        let session = Session::training_on(week_commencing, date).ok_or(BoardError::NotTrainingDay(date))?;
        let roster: HashSet<&str> = players.iter().map(|p| p.name.as_str()).collect();

        let mut by_name: HashMap<&str, AttendanceRow> = HashMap::new();
        for row in ledger {
            if row.session != session || row.week_commencing != Some(week_commencing) {
                continue;
            }
            if !roster.contains(row.name.as_str()) {
                log::warn!("'{}' is on the ledger but not the roster, skipped", row.name);
                continue;
            }
            let available = row.available == Some(true);
            let recorded = row.attended.is_some();
            if available || recorded {
                by_name.insert(
                    &row.name,
                    AttendanceRow {
                        name: row.name.clone(),
                        available,
                        attended: row.attended.unwrap_or(false),
                        recorded,
                    },
                );
            }
        }

        let previously_saved = by_name.values().any(|r| r.recorded);
        let mut rows: Vec<AttendanceRow> = by_name.into_values().collect();
        rows.sort_by(|a, b| {
            b.available
                .cmp(&a.available)
                .then_with(|| {
                    if a.recorded && b.recorded {
                        b.attended.cmp(&a.attended)
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .then_with(|| a.name.cmp(&b.name))
        });
        if rows.len() > capacity {
            log::warn!("{} players for {}, register holds {capacity}", rows.len(), format_week(date));
            rows.truncate(capacity);
        }

        Ok(Self {
            date,
            session,
            rows,
            previously_saved,
            capacity,
        })
    }

    /// Writes B1, E1, the A3:C3 headers, and numbered rows from A4.
    pub fn render_into(&self, sheet: &mut Table) {
        sheet.set_a1(DATE_CELL, format_week(self.date));
        sheet.set_a1(SAVED_CELL, render_bool(Some(self.previously_saved)));
        for (c, h) in HEADERS.iter().enumerate() {
            sheet.set(HEADER_ROW, c, *h);
        }
        for i in 0..self.capacity {
            let row = FIRST_ROW + i;
            sheet.set(row, 0, (i + 1).to_string());
            match self.rows.get(i) {
                Some(r) => {
                    sheet.set(row, 1, r.name.clone());
                    sheet.set(row, 2, render_bool(Some(r.attended)));
                }
                None => {
                    sheet.set(row, 1, "");
                    sheet.set(row, 2, "");
                }
            }
        }
    }
}

/// The date in B1 and every named row of the register.
pub fn read_marks(sheet: &Table) -> Result<(NaiveDate, Vec<(String, bool)>), BoardError> {
    let raw = sheet.get_a1(DATE_CELL);
    let date = parse_date(raw).ok_or_else(|| BoardError::BadDate(raw.to_string()))?;
    let marks = (FIRST_ROW..sheet.rows.len())
        .filter_map(|row| {
            let name = sheet.cell(row, 1).trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), parse_bool(sheet.cell(row, 2)) == Some(true)))
        })
        .collect();
    Ok((date, marks))
}

/// Every Tuesday and Thursday session date in the schedule.
pub fn training_dates(weeks: &[ScheduleWeek]) -> Vec<NaiveDate> {
    weeks
        .iter()
        .flat_map(|w| {
            w.sessions()
                .iter()
                .filter(|s| s.is_training())
                .map(|s| w.session_date(s))
                .collect::<Vec<_>>()
        })
        .collect()
}
