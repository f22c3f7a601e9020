//! Sheet edits mapped to the pipeline they trigger.
//!
//! An edit is identified by sheet name and cell. `EditIntent::classify`
//! decides what the edit means; `dispatch` runs the matching pipeline. Edits
//! on other sheets, or on cells nothing watches, classify to `None`.

use chrono::NaiveDateTime;
use serde::Serialize;
use squadsheet_board::{
    AttendanceSheet, BoardView, PositionsBoard, RosterBoard, SelectionOptions, SelectionSheet,
};
use squadsheet_config::{Settings, SheetNames};
use squadsheet_core::model::parse_bool;
use squadsheet_core::{CellRef, Workbook};

use crate::error::CliError;
use crate::pipelines::{self, AttendanceReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditIntent {
    /// Positions!B1: the squad filter.
    PositionsFilter,
    /// Any cell on the schedule.
    ScheduleChanged,
    /// Selection!A2: the week dropdown.
    SelectionWeek,
    /// Attendance!B1: the session date.
    AttendanceDate,
    /// Attendance!E1 ticked.
    AttendanceSave,
    /// Any other attendance edit; the register no longer matches what was saved.
    AttendanceReset,
}

impl EditIntent {
    pub fn classify(sheets: &SheetNames, sheet: &str, cell: CellRef, value: &str) -> Option<Self> {
        let b1 = CellRef::new(0, 1);
        if sheet == sheets.positions {
            (cell == b1).then_some(Self::PositionsFilter)
        } else if sheet == sheets.schedule {
            Some(Self::ScheduleChanged)
        } else if sheet == sheets.selection {
            (cell == CellRef::new(1, 0)).then_some(Self::SelectionWeek)
        } else if sheet == sheets.attendance {
            if cell == b1 {
                Some(Self::AttendanceDate)
            } else if cell == CellRef::new(0, 4) && parse_bool(value) == Some(true) {
                Some(Self::AttendanceSave)
            } else {
                Some(Self::AttendanceReset)
            }
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Dispatched {
    Positions { board: PositionsBoard },
    Schedule { board: RosterBoard, selection: SelectionOptions },
    Selection { sheet: Option<SelectionSheet> },
    AttendanceLoaded { register: AttendanceSheet },
    AttendanceSaved { report: AttendanceReport },
    AttendanceReset,
}

pub fn dispatch(
    intent: EditIntent,
    wb: &mut dyn Workbook,
    settings: &Settings,
    now: NaiveDateTime,
) -> Result<Dispatched, CliError> {
    log::debug!("dispatching {intent:?}");
    Ok(match intent {
        EditIntent::PositionsFilter => Dispatched::Positions {
            board: pipelines::refresh_positions(wb, settings)?,
        },
        EditIntent::ScheduleChanged => Dispatched::Schedule {
            board: pipelines::refresh_board(wb, settings, now.date(), BoardView::Private)?,
            selection: pipelines::refresh_selection_options(wb, settings, now.date())?,
        },
        EditIntent::SelectionWeek => Dispatched::Selection {
            sheet: pipelines::refresh_selection(wb, settings)?,
        },
        EditIntent::AttendanceDate => Dispatched::AttendanceLoaded {
            register: pipelines::load_attendance(wb, settings, None)?,
        },
        EditIntent::AttendanceSave => Dispatched::AttendanceSaved {
            report: pipelines::save_register(wb, settings, now)?,
        },
        EditIntent::AttendanceReset => {
            pipelines::reset_attendance_flag(wb, settings)?;
            Dispatched::AttendanceReset
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(a1: &str) -> CellRef {
        CellRef::parse(a1).unwrap()
    }

    #[test]
    fn classify_edits() {
        let sheets = SheetNames::default();
        let classify = |sheet: &str, a1: &str, value: &str| EditIntent::classify(&sheets, sheet, cell(a1), value);

        assert_eq!(classify("Positions", "B1", "1st XV"), Some(EditIntent::PositionsFilter));
        assert_eq!(classify("Positions", "C4", "x"), None);
        assert_eq!(classify("Schedule", "F9", "Ware"), Some(EditIntent::ScheduleChanged));
        assert_eq!(classify("Selection", "A2", "Week 3"), Some(EditIntent::SelectionWeek));
        assert_eq!(classify("Selection", "B2", ""), None);
        assert_eq!(classify("Attendance", "B1", "2 Jan 24"), Some(EditIntent::AttendanceDate));
        assert_eq!(classify("Attendance", "E1", "TRUE"), Some(EditIntent::AttendanceSave));
        assert_eq!(classify("Attendance", "E1", "FALSE"), Some(EditIntent::AttendanceReset));
        assert_eq!(classify("Attendance", "C7", "TRUE"), Some(EditIntent::AttendanceReset));
        assert_eq!(classify("Players", "A2", "Alice"), None);
    }
}
