//! Workbook pipelines: each reads the sheets it needs, runs one or more
//! passes, and writes the affected sheets back.
//!
//! These are the handlers behind the form-submit trigger, the weekly form
//! refresh, sign-ups, and every edit intent.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use squadsheet_board::{
    apply_week_labels, form_choices, read_marks, selection_options, training_dates,
    AttendanceSheet, AvailabilityGrid, BoardOptions, BoardView, FormChoices, PositionsBoard,
    RosterBoard, SelectionOptions, SelectionSheet, SquadFilter,
};
use squadsheet_config::Settings;
use squadsheet_core::{CellRef, LedgerRow, Player, ScheduleWeek, Table, Workbook};
use squadsheet_recon::{
    apply_plan, merge_signups, reconcile, save_attendance, AttendanceMark, LedgerPlan,
    ReconInput, ReconSummary, SavedAttendance, ScheduleIndex,
};

use crate::error::CliError;

const SELECTED_WEEK: CellRef = CellRef::new(1, 0); // Selection!A2
const POSITIONS_FILTER: CellRef = CellRef::new(0, 1); // Positions!B1
const ATTENDANCE_SAVED: CellRef = CellRef::new(0, 4); // Attendance!E1

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn schedule(wb: &dyn Workbook, settings: &Settings) -> Result<Vec<ScheduleWeek>, CliError> {
    let name = &settings.sheets.schedule;
    Ok(ScheduleWeek::parse_table(name, &wb.require(name)?)?)
}

fn players(wb: &dyn Workbook, settings: &Settings) -> Result<Vec<Player>, CliError> {
    let name = &settings.sheets.players;
    Ok(Player::parse_table(name, &wb.require(name)?)?)
}

fn grid(wb: &dyn Workbook, settings: &Settings) -> Result<AvailabilityGrid, CliError> {
    let name = &settings.sheets.availability_latest;
    Ok(AvailabilityGrid::from_ledger(name, &wb.table_or_empty(name)?)?)
}

fn ledger_rows(wb: &dyn Workbook, settings: &Settings) -> Result<Vec<LedgerRow>, CliError> {
    let name = &settings.sheets.availability_latest;
    let ledger = wb.table_or_empty(name)?;
    if ledger.data_len() == 0 {
        return Ok(Vec::new());
    }
    Ok(LedgerRow::parse_table(name, &ledger)?)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Merge form submissions and attendance into the ledger. With `write`
/// false the plan is computed and nothing is saved.
pub fn reconcile_ledger(
    wb: &mut dyn Workbook,
    settings: &Settings,
    now: NaiveDateTime,
    write: bool,
) -> Result<LedgerPlan, CliError> {
    let sheets = &settings.sheets;
    let history = wb.table_or_empty(&sheets.attendance_history)?;
    let schedule = wb.require(&sheets.schedule)?;
    let form = wb.table_or_empty(&sheets.availability_form)?;
    let ledger = wb.table_or_empty(&sheets.availability_latest)?;

    let plan = reconcile(
        &ReconInput {
            attendance_history: &history,
            schedule: &schedule,
            form: &form,
            ledger: &ledger,
        },
        now,
    )?;

    if plan.is_empty() {
        log::info!("{}: already up to date", sheets.availability_latest);
    } else if write {
        wb.put_table(&sheets.availability_latest, apply_plan(&ledger, &plan))?;
    }
    Ok(plan)
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

/// Rebuild the private roster board, or the public export. A failed public
/// write is logged and the board is still returned.
pub fn refresh_board(
    wb: &mut dyn Workbook,
    settings: &Settings,
    today: NaiveDate,
    view: BoardView,
) -> Result<RosterBoard, CliError> {
    let options = BoardOptions {
        view,
        horizon_weeks: settings.limits.board_horizon_weeks,
        max_rows: settings.limits.public_max_rows,
    };
    let board = RosterBoard::build(
        &grid(wb, settings)?,
        &schedule(wb, settings)?,
        &players(wb, settings)?,
        &options,
        today,
    );

    match view {
        BoardView::Private => wb.put_table(&settings.sheets.availability, board.to_table())?,
        BoardView::Public => {
            if let Err(e) = wb.put_table(&settings.sheets.availability_public, board.to_table()) {
                log::warn!("public export not written: {e}");
            }
        }
    }
    Ok(board)
}

/// Rebuild the public export after the ledger changed. Any failure is
/// logged and the calling pipeline carries on.
fn refresh_public_export(wb: &mut dyn Workbook, settings: &Settings, today: NaiveDate) {
    if let Err(e) = refresh_board(wb, settings, today, BoardView::Public) {
        log::warn!("{}: not refreshed: {e}", settings.sheets.availability_public);
    }
}

/// Refresh the week dropdown on the selection sheet and settle A2.
pub fn refresh_selection_options(
    wb: &mut dyn Workbook,
    settings: &Settings,
    today: NaiveDate,
) -> Result<SelectionOptions, CliError> {
    let name = &settings.sheets.selection;
    let mut sheet = wb.table_or_empty(name)?;
    let options = selection_options(
        &schedule(wb, settings)?,
        &grid(wb, settings)?,
        today,
        sheet.get_a1(SELECTED_WEEK),
    );
    if sheet.get_a1(SELECTED_WEEK) != options.selected {
        sheet.set_a1(SELECTED_WEEK, options.selected.clone());
        wb.put_table(name, sheet)?;
    }
    Ok(options)
}

/// Rebuild the selection sheet for the week in A2. `None` when no week is
/// selected yet.
pub fn refresh_selection(wb: &mut dyn Workbook, settings: &Settings) -> Result<Option<SelectionSheet>, CliError> {
    let name = &settings.sheets.selection;
    let mut sheet = wb.table_or_empty(name)?;
    let label = sheet.get_a1(SELECTED_WEEK).trim().to_string();
    if label.is_empty() {
        log::info!("{name}: no week selected");
        return Ok(None);
    }

    let selection = SelectionSheet::build(&players(wb, settings)?, &grid(wb, settings)?, &label)?;
    selection.render_into(&mut sheet);
    wb.put_table(name, sheet)?;
    Ok(Some(selection))
}

/// Rebuild the positions board using the squad filter in B1.
pub fn refresh_positions(wb: &mut dyn Workbook, settings: &Settings) -> Result<PositionsBoard, CliError> {
    let name = &settings.sheets.positions;
    let mut sheet = wb.table_or_empty(name)?;
    let filter: SquadFilter = sheet.get_a1(POSITIONS_FILTER).parse()?;
    if sheet.get_a1(POSITIONS_FILTER).is_empty() {
        sheet.set_a1(POSITIONS_FILTER, "Squad");
    }

    let board = PositionsBoard::build(&players(wb, settings)?, filter);
    board.render_into(&mut sheet);
    wb.put_table(name, sheet)?;
    Ok(board)
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Rewrite the schedule's week labels and work out the form's choices.
pub fn update_form(wb: &mut dyn Workbook, settings: &Settings, now: NaiveDateTime) -> Result<FormChoices, CliError> {
    let name = &settings.sheets.schedule;
    let mut table = wb.require(name)?;
    let labels = apply_week_labels(name, &mut table, now)?;
    wb.put_table(name, table)?;
    Ok(form_choices(&labels, &players(wb, settings)?, settings.limits.form_week_choices))
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub ledger: ReconSummary,
    pub board_rows: usize,
    pub selection: Option<String>,
}

/// A new availability form response: ledger, private board, selection.
pub fn form_submit(wb: &mut dyn Workbook, settings: &Settings, now: NaiveDateTime) -> Result<SubmitReport, CliError> {
    let plan = reconcile_ledger(wb, settings, now, true)?;
    refresh_public_export(wb, settings, now.date());
    let board = refresh_board(wb, settings, now.date(), BoardView::Private)?;
    let selection = refresh_selection(wb, settings)?;
    Ok(SubmitReport {
        ledger: plan.summary,
        board_rows: board.rows.len(),
        selection: selection.map(|s| s.label),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupReport {
    pub added: Vec<String>,
    /// Only refreshed when someone was added.
    pub form: Option<FormChoices>,
}

/// A new sign-up form response: roster, positions board, form choices.
/// Nothing is written when every sign-up is already on the roster.
pub fn signup(wb: &mut dyn Workbook, settings: &Settings, now: NaiveDateTime) -> Result<SignupReport, CliError> {
    let sheets = &settings.sheets;
    let merged = merge_signups(&wb.require(&sheets.players)?, &wb.require(&sheets.signup_form)?)?;
    if merged.added.is_empty() {
        log::info!("{}: no new sign-ups", sheets.players);
        return Ok(SignupReport {
            added: Vec::new(),
            form: None,
        });
    }
    wb.put_table(&sheets.players, merged.table)?;
    refresh_positions(wb, settings)?;
    let form = Some(update_form(wb, settings, now)?);
    Ok(SignupReport {
        added: merged.added,
        form,
    })
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// Fill the attendance sheet for `date`, or for the date already in B1.
pub fn load_attendance(
    wb: &mut dyn Workbook,
    settings: &Settings,
    date: Option<NaiveDate>,
) -> Result<AttendanceSheet, CliError> {
    let name = &settings.sheets.attendance;
    let mut sheet = wb.table_or_empty(name)?;
    let date = match date {
        Some(d) => d,
        None => read_marks(&sheet)?.0,
    };
    let register = AttendanceSheet::load(
        &players(wb, settings)?,
        &ledger_rows(wb, settings)?,
        date,
        settings.limits.attendance_capacity,
    )?;
    register.render_into(&mut sheet);
    wb.put_table(name, sheet)?;
    Ok(register)
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub saved: SavedAttendance,
    pub ledger: ReconSummary,
}

/// Save the ticked register into the history, then bring the ledger and
/// the private board up to date.
pub fn save_register(wb: &mut dyn Workbook, settings: &Settings, now: NaiveDateTime) -> Result<AttendanceReport, CliError> {
    let sheets = &settings.sheets;
    let (date, marks) = read_marks(&wb.require(&sheets.attendance)?)?;
    let marks: Vec<AttendanceMark> = marks
        .into_iter()
        .map(|(name, attended)| AttendanceMark { name, attended })
        .collect();

    let index = ScheduleIndex::from_table(&wb.require(&sheets.schedule)?)?;
    let saved = save_attendance(&wb.table_or_empty(&sheets.attendance_history)?, &index, date, &marks, now)?;
    wb.put_table(&sheets.attendance_history, saved.table.clone())?;
    log::info!("attendance for {date} ({}) saved: {} player(s)", saved.session, saved.recorded);

    let plan = reconcile_ledger(wb, settings, now, true)?;
    refresh_public_export(wb, settings, now.date());
    refresh_board(wb, settings, now.date(), BoardView::Private)?;
    Ok(AttendanceReport {
        saved,
        ledger: plan.summary,
    })
}

/// Any other edit on the attendance sheet clears the saved flag.
pub fn reset_attendance_flag(wb: &mut dyn Workbook, settings: &Settings) -> Result<(), CliError> {
    let name = &settings.sheets.attendance;
    let mut sheet = wb.table_or_empty(name)?;
    sheet.set_a1(ATTENDANCE_SAVED, "FALSE");
    wb.put_table(name, sheet)?;
    Ok(())
}

pub fn attendance_dates(wb: &dyn Workbook, settings: &Settings) -> Result<Vec<NaiveDate>, CliError> {
    Ok(training_dates(&schedule(wb, settings)?))
}

/// Apply a single cell edit to a sheet, creating the sheet if needed.
pub fn write_cell(wb: &mut dyn Workbook, sheet: &str, cell: CellRef, value: &str) -> Result<(), CliError> {
    let mut table: Table = wb.table_or_empty(sheet)?;
    table.set_a1(cell, value);
    wb.put_table(sheet, table)?;
    Ok(())
}
