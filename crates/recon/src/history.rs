//! Saving a training session's attendance into the history sheet.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use squadsheet_core::dates::{monday_of, parse_date};
use squadsheet_core::model::ATTENDANCE_HEADERS;
use squadsheet_core::{AttendanceEntry, Session, Table};

use crate::error::ReconError;
use crate::index::ScheduleIndex;
use crate::model::ATTENDANCE_SHEET;

/// One ticked (or unticked) row of the attendance sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    pub name: String,
    pub attended: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedAttendance {
    #[serde(skip)]
    pub table: Table,
    pub date: NaiveDate,
    pub session: Session,
    /// Schedule week number, when the week is on the schedule.
    pub week: Option<u32>,
    pub recorded: usize,
    /// Earlier entries for the same date and session that were dropped.
    pub replaced: usize,
}

/// Record `marks` for the training session on `date`.
///
/// Entries already held for the same date and session are replaced as a
/// batch; the result is sorted by date then name.
pub fn save_attendance(
    history: &Table,
    schedule: &ScheduleIndex,
    date: NaiveDate,
    marks: &[AttendanceMark],
    now: NaiveDateTime,
) -> Result<SavedAttendance, ReconError> {
    let week_commencing = monday_of(date);
    let session =
        Session::training_on(week_commencing, date).ok_or(ReconError::NotTrainingDay(date))?;
    let week = schedule.by_commencing(week_commencing).map(|w| w.number);
    if week.is_none() {
        log::warn!("{date} is not in a scheduled week; saving without a week number");
    }

    let headers: Vec<String> = if history.is_empty() {
        ATTENDANCE_HEADERS.iter().map(|h| h.to_string()).collect()
    } else {
        history.headers().to_vec()
    };
    let idx = Table::from_rows(vec![headers.clone()]).index(ATTENDANCE_SHEET, &["Name", "Session", "Date"])?;

    let mut replaced = 0;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in history.data_rows() {
        let same_date = parse_date(idx.value(row, "Date")) == Some(date);
        let same_session = Session::parse(idx.value(row, "Session")) == Some(session);
        if same_date && same_session {
            replaced += 1;
            continue;
        }
        let mut row = row.clone();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    let mut recorded = 0;
    for mark in marks {
        let name = mark.name.trim();
        if name.is_empty() {
            continue;
        }
        let entry = AttendanceEntry {
            week,
            week_commencing,
            name: name.to_string(),
            session,
            attended: Some(mark.attended),
            date: Some(date),
            last_updated: Some(now),
        };
        rows.push(entry.render(&headers));
        recorded += 1;
    }

    rows.sort_by(|a, b| {
        let (da, db) = (parse_date(idx.value(a, "Date")), parse_date(idx.value(b, "Date")));
        da.cmp(&db)
            .then_with(|| idx.value(a, "Name").cmp(idx.value(b, "Name")))
    });

    let mut table = Table::from_rows(vec![headers]);
    for row in rows {
        table.push_row(row);
    }

    log::info!("attendance for {date} ({session}) saved: {recorded} player(s) recorded");
    Ok(SavedAttendance {
        table,
        date,
        session,
        week,
        recorded,
        replaced,
    })
}
