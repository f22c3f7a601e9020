use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use squadsheet_core::model::{parse_bool, render_bool, LEDGER_HEADERS};
use squadsheet_core::{AttendanceKey, LedgerKey, LedgerRow, Session, Table};

use crate::error::ReconError;
use crate::index::{AttendanceIndex, ScheduleIndex, SubmissionIndex};
use crate::model::{LedgerPlan, ReconInput, ReconSummary, RowUpdate, LEDGER_SHEET};

const LEDGER_REQUIRED: &[&str] = &["Name", "#", "Week commencing", "Event", "Available", "Attended"];

/// The ledger as read before the merge.
struct ExistingLedger<'a> {
    headers: Vec<String>,
    write_headers: bool,
    raw: &'a [Vec<String>],
    /// Parsed view of each data row; `None` where the row has no usable key.
    rows: Vec<Option<LedgerRow>>,
    /// Key → last data row holding it.
    by_key: HashMap<LedgerKey, usize>,
    /// Earlier rows repeating a key held further down.
    duplicates: Vec<usize>,
    attended_col: usize,
}

impl<'a> ExistingLedger<'a> {
    fn load(table: &'a Table) -> Result<Self, ReconError> {
        if table.is_empty() {
            let headers: Vec<String> = LEDGER_HEADERS.iter().map(|h| h.to_string()).collect();
            let attended_col = headers.iter().position(|h| h == "Attended").unwrap_or(6);
            return Ok(Self {
                headers,
                write_headers: true,
                raw: &[],
                rows: Vec::new(),
                by_key: HashMap::new(),
                duplicates: Vec::new(),
                attended_col,
            });
        }

        let idx = table.index(LEDGER_SHEET, LEDGER_REQUIRED)?;
        let attended_col = idx.get("Attended").unwrap_or(6);
        let rows: Vec<Option<LedgerRow>> = table
            .data_rows()
            .iter()
            .map(|r| LedgerRow::from_row(&idx, r))
            .collect();

        let mut by_key = HashMap::new();
        let mut duplicates = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if let Some(row) = row {
                if let Some(prev) = by_key.insert(row.key(), i) {
                    duplicates.push(prev);
                }
            }
        }
        if !duplicates.is_empty() {
            log::warn!("{LEDGER_SHEET}: {} duplicate row(s) will be dropped", duplicates.len());
        }

        Ok(Self {
            headers: table.headers().to_vec(),
            write_headers: false,
            raw: table.data_rows(),
            rows,
            by_key,
            duplicates,
            attended_col,
        })
    }
}

/// Merge form submissions, attendance history and the schedule into write
/// instructions for the ledger. Running it again on the applied result
/// yields an empty plan.
pub fn reconcile(input: &ReconInput<'_>, now: NaiveDateTime) -> Result<LedgerPlan, ReconError> {
    let schedule = ScheduleIndex::from_table(input.schedule)?;
    let submissions = SubmissionIndex::from_table(input.form)?;
    let attendance = AttendanceIndex::from_table(input.attendance_history)?;
    let ledger = ExistingLedger::load(input.ledger)?;

    let mut summary = ReconSummary {
        submissions: submissions.len(),
        ..ReconSummary::default()
    };

    // One record per held session of each latest submission. Two labels
    // resolving to the same week keep the newer submission.
    let mut computed: BTreeMap<LedgerKey, LedgerRow> = BTreeMap::new();
    for sub in submissions.iter() {
        let Some(week) = schedule.by_label(&sub.week_label) else {
            log::debug!("no schedule week labelled '{}' ({})", sub.week_label, sub.name);
            summary.unscheduled_submissions += 1;
            continue;
        };
        let held = week.sessions();
        for session in Session::ALL {
            if !held.contains(session) {
                if sub.declares(session) {
                    summary.skipped_sessions += 1;
                }
                continue;
            }
            let row = LedgerRow {
                name: sub.name.clone(),
                week: week.number,
                week_commencing: Some(week.week_commencing),
                session,
                date: Some(week.session_date(session)),
                available: Some(sub.declares(session)),
                attended: attendance.attended(&AttendanceKey {
                    name: sub.name.clone(),
                    week_commencing: week.week_commencing,
                    session,
                }),
                last_updated: Some(sub.timestamp),
            };
            match computed.get(&row.key()) {
                Some(held_row) if held_row.last_updated > row.last_updated => {}
                _ => {
                    computed.insert(row.key(), row);
                }
            }
        }
    }

    let mut plan = LedgerPlan {
        headers: ledger.headers.clone(),
        write_headers: ledger.write_headers,
        removals: ledger.duplicates.clone(),
        ..LedgerPlan::default()
    };
    let mut updated: HashSet<usize> = HashSet::new();
    let mut planned: HashSet<LedgerKey> = HashSet::new();

    for (key, mut row) in computed {
        match ledger.by_key.get(&key) {
            Some(&i) => {
                if row.attended.is_none() {
                    row.attended = ledger.rows[i].as_ref().and_then(|r| r.attended);
                }
                let raw = &ledger.raw[i];
                let cells = render_over(&plan.headers, &row, raw);
                if differs(&plan.headers, &cells, raw) {
                    plan.updates.push(RowUpdate { row: i, cells });
                    updated.insert(i);
                }
            }
            None => plan.inserts.push(row.render(&plan.headers)),
        }
        planned.insert(key);
    }

    // Existing rows whose attendance can be refreshed without a new submission.
    let dropped: HashSet<usize> = ledger.duplicates.iter().copied().collect();
    for (i, parsed) in ledger.rows.iter().enumerate() {
        if updated.contains(&i) || dropped.contains(&i) {
            continue;
        }
        let Some(row) = parsed else { continue };
        let Some(week_commencing) = row.week_commencing else { continue };
        let key = AttendanceKey {
            name: row.name.clone(),
            week_commencing,
            session: row.session,
        };
        let Some(attended) = attendance.attended(&key) else { continue };
        if row.attended == Some(attended) {
            continue;
        }
        let mut cells = ledger.raw[i].clone();
        if cells.len() < plan.headers.len() {
            cells.resize(plan.headers.len(), String::new());
        }
        cells[ledger.attended_col] = render_bool(Some(attended));
        plan.updates.push(RowUpdate { row: i, cells });
        updated.insert(i);
        summary.attendance_refreshes += 1;
    }

    // Attendance for players with no ledger row at all.
    for entry in attendance.iter() {
        let Some(week) = schedule.by_commencing(entry.week_commencing) else {
            log::debug!(
                "attendance for {} on unscheduled week {}, skipped",
                entry.name,
                entry.week_commencing
            );
            continue;
        };
        if !week.sessions().contains(entry.session) {
            log::debug!(
                "attendance for {} at {} in week {}: session not held, skipped",
                entry.name,
                entry.session,
                week.number
            );
            continue;
        }
        let key = LedgerKey {
            name: entry.name.clone(),
            week: week.number,
            session: entry.session,
        };
        if ledger.by_key.contains_key(&key) || planned.contains(&key) {
            continue;
        }
        let row = LedgerRow {
            name: entry.name.clone(),
            week: week.number,
            week_commencing: Some(entry.week_commencing),
            session: entry.session,
            date: entry.date.or_else(|| Some(week.session_date(entry.session))),
            available: None,
            attended: entry.attended,
            last_updated: Some(entry.last_updated.unwrap_or(now)),
        };
        plan.inserts.push(row.render(&plan.headers));
        planned.insert(key);
        summary.attendance_only_inserts += 1;
    }

    plan.updates.sort_by_key(|u| u.row);
    summary.updates = plan.updates.len();
    summary.inserts = plan.inserts.len();
    summary.removals = plan.removals.len();
    plan.summary = summary;

    log::info!(
        "ledger plan: {} update(s), {} insert(s), {} removal(s)",
        plan.updates.len(),
        plan.inserts.len(),
        plan.removals.len()
    );
    Ok(plan)
}

/// Render `row` over an existing row, keeping columns the ledger doesn't own.
fn render_over(headers: &[String], row: &LedgerRow, raw: &[String]) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            row.render_field(h)
                .unwrap_or_else(|| raw.get(i).cloned().unwrap_or_default())
        })
        .collect()
}

/// Textual comparison; the Attended column compares with blanks and
/// non-boolean text normalised to empty.
fn differs(headers: &[String], new: &[String], raw: &[String]) -> bool {
    headers.iter().enumerate().any(|(i, h)| {
        let old = raw.get(i).map(String::as_str).unwrap_or("");
        let new = new.get(i).map(String::as_str).unwrap_or("");
        if h.trim() == "Attended" {
            render_bool(parse_bool(old)) != render_bool(parse_bool(new))
        } else {
            old != new
        }
    })
}

/// Apply a plan and re-sort. Returns the full new ledger table.
pub fn apply_plan(ledger: &Table, plan: &LedgerPlan) -> Table {
    let mut rows: Vec<Option<Vec<String>>> = ledger.data_rows().iter().cloned().map(Some).collect();
    for update in &plan.updates {
        if let Some(slot) = rows.get_mut(update.row) {
            *slot = Some(update.cells.clone());
        }
    }
    for &r in &plan.removals {
        if let Some(slot) = rows.get_mut(r) {
            *slot = None;
        }
    }

    let mut all = Vec::with_capacity(rows.len() + plan.inserts.len() + 1);
    all.push(plan.headers.clone());
    all.extend(rows.into_iter().flatten());
    all.extend(plan.inserts.iter().cloned());

    let mut table = Table::from_rows(all);
    sort_ledger(&mut table);
    table
}

/// Sort by week number, then name, then the session label as text
/// (so Sat, Thurs, Tues within a week). Rows without a week number go last.
pub fn sort_ledger(table: &mut Table) {
    let (Some(week), Some(name), Some(event)) =
        (table.column("#"), table.column("Name"), table.column("Event"))
    else {
        log::warn!("{LEDGER_SHEET}: cannot sort without #, Name and Event columns");
        return;
    };
    if table.rows.len() < 2 {
        return;
    }

    let cell = |row: &[String], col: usize| row.get(col).map(|s| s.trim().to_string()).unwrap_or_default();
    table.rows[1..].sort_by(|a, b| {
        let wa = cell(a, week).parse::<u32>().ok();
        let wb = cell(b, week).parse::<u32>().ok();
        let (na, nb) = (cell(a, name), cell(b, name));
        week_order(wa, wb)
            .then_with(|| na.to_lowercase().cmp(&nb.to_lowercase()))
            .then_with(|| na.cmp(&nb))
            .then_with(|| cell(a, event).cmp(&cell(b, event)))
    });
}

fn week_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn schedule() -> Table {
        table(&[
            &["#", "Week commencing", "Tues", "Thurs", "Match Date", "1st", "2nd", "Week Label"],
            &["1", "2024-01-01", "TRUE", "TRUE", "2024-01-06", "Ware", "", "wk1"],
            &["2", "2024-01-08", "TRUE", "FALSE", "", "", "", "wk2"],
        ])
    }

    const FORM: &[&str] = &[
        "Timestamp",
        "Name",
        "Week commencing",
        "Select your training attendance / match day availability",
    ];
    const HISTORY: &[&str] = &["#", "Week commencing", "Name", "Session", "Attended", "Date", "Last updated"];

    fn events(t: &Table) -> Vec<(String, String, String)> {
        let name = t.column("Name").unwrap();
        let week = t.column("#").unwrap();
        let event = t.column("Event").unwrap();
        t.data_rows()
            .iter()
            .map(|r| (r[week].clone(), r[name].clone(), r[event].clone()))
            .collect()
    }

    fn run(history: &Table, form: &Table, ledger: &Table) -> (LedgerPlan, Table) {
        let sched = schedule();
        let input = ReconInput {
            attendance_history: history,
            schedule: &sched,
            form,
            ledger,
        };
        let plan = reconcile(&input, now()).unwrap();
        let applied = apply_plan(ledger, &plan);
        (plan, applied)
    }

    #[test]
    fn submission_expands_into_held_sessions_only() {
        let form = table(&[FORM, &["2024-01-01 09:00:00", "Bob", "wk2", "Tuesday, Thursday, Saturday"]]);
        let (plan, ledger) = run(&Table::default(), &form, &Table::default());

        assert!(plan.write_headers);
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.summary.skipped_sessions, 2);
        assert_eq!(events(&ledger), vec![("2".into(), "Bob".into(), "Tues".into())]);
    }

    #[test]
    fn attendance_without_submission_is_inserted() {
        let history = table(&[
            HISTORY,
            &["1", "2024-01-01", "Alice", "Tues", "TRUE", "2024-01-02", "2024-01-02 21:00:00"],
        ]);
        let (plan, ledger) = run(&history, &table(&[FORM]), &Table::default());
        assert_eq!(plan.summary.attendance_only_inserts, 1);

        let idx = ledger.index("AvailabilityLatest", LEDGER_REQUIRED).unwrap();
        let row = &ledger.data_rows()[0];
        assert_eq!(idx.value(row, "Name"), "Alice");
        assert_eq!(idx.value(row, "Event"), "Tues");
        assert_eq!(idx.value(row, "Attended"), "TRUE");
        assert_eq!(idx.value(row, "Available"), "");
    }

    #[test]
    fn attendance_refreshes_existing_row_and_keeps_available() {
        let form = table(&[FORM, &["2024-01-01 09:00:00", "Alice", "wk1", "Tuesday"]]);
        let (_, ledger) = run(&Table::default(), &form, &Table::default());

        let history = table(&[
            HISTORY,
            &["1", "1 Jan 24", "Alice", "Thurs", "TRUE", "2024-01-04", "2024-01-04 21:00:00"],
        ]);
        let (plan, ledger) = run(&history, &form, &ledger);
        assert_eq!(plan.updates.len(), 1);
        assert!(plan.inserts.is_empty());

        let rows = LedgerRow::parse_table("AvailabilityLatest", &ledger).unwrap();
        let thurs = rows.iter().find(|r| r.session == Session::Thurs).unwrap();
        assert_eq!(thurs.available, Some(false));
        assert_eq!(thurs.attended, Some(true));
    }

    #[test]
    fn attended_survives_when_history_has_no_entry() {
        let ledger = table(&[
            LEDGER_HEADERS,
            &["Alice", "1", "1 Jan 24", "Tues", "2 Jan 24", "TRUE", "TRUE", "2024-01-01 09:00:00"],
        ]);
        let form = table(&[FORM, &["2024-01-03 09:00:00", "Alice", "wk1", "Thursday"]]);
        let (plan, applied) = run(&Table::default(), &form, &ledger);
        let update = plan.updates.iter().find(|u| u.cells[3] == "Tues").unwrap();
        assert_eq!(update.cells[5], "FALSE");
        assert_eq!(update.cells[6], "TRUE");
        assert_eq!(applied.data_len(), 3);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let form = table(&[
            FORM,
            &["2024-01-01 09:00:00", "Alice", "wk1", "Tuesday, Saturday"],
            &["2024-01-02 09:00:00", "Bob", "wk2", "Tuesday"],
        ]);
        let history = table(&[
            HISTORY,
            &["1", "1 Jan 24", "Alice", "Tues", "FALSE", "2024-01-02", "2024-01-02 21:00:00"],
            &["1", "1 Jan 24", "Cara", "Thurs", "TRUE", "2024-01-04", "2024-01-04 21:00:00"],
        ]);
        let (first, ledger) = run(&history, &form, &Table::default());
        assert!(!first.is_empty());
        let (second, again) = run(&history, &form, &ledger);
        assert!(second.is_empty(), "unexpected writes: {second:?}");
        assert_eq!(again, ledger);
    }

    #[test]
    fn later_submission_replaces_earlier_one() {
        let form = table(&[
            FORM,
            &["2024-01-02 09:00:00", "Alice", "wk1", "Thursday"],
            &["2024-01-01 09:00:00", "Alice", "wk1", "Tuesday, Saturday"],
        ]);
        let (_, ledger) = run(&Table::default(), &form, &Table::default());
        let rows = LedgerRow::parse_table("AvailabilityLatest", &ledger).unwrap();
        let available: Vec<_> = rows.iter().map(|r| (r.session, r.available)).collect();
        assert_eq!(
            available,
            vec![
                (Session::Sat, Some(false)),
                (Session::Thurs, Some(true)),
                (Session::Tues, Some(false)),
            ]
        );
    }

    #[test]
    fn duplicate_ledger_rows_are_collapsed() {
        let ledger = table(&[
            LEDGER_HEADERS,
            &["Alice", "1", "1 Jan 24", "Tues", "2 Jan 24", "TRUE", "", "2024-01-01 09:00:00"],
            &["Alice", "1", "1 Jan 24", "Tues", "2 Jan 24", "FALSE", "", "2024-01-01 10:00:00"],
        ]);
        let (plan, applied) = run(&Table::default(), &table(&[FORM]), &ledger);
        assert_eq!(plan.removals, vec![0]);
        assert_eq!(applied.data_len(), 1);
        assert_eq!(applied.data_rows()[0][5], "FALSE");
    }

    #[test]
    fn unknown_columns_are_preserved_on_update() {
        let mut headers: Vec<&str> = LEDGER_HEADERS.to_vec();
        headers.push("Notes");
        let ledger = table(&[
            &headers,
            &["Alice", "1", "1 Jan 24", "Tues", "2 Jan 24", "TRUE", "", "2024-01-01 09:00:00", "captain"],
        ]);
        let form = table(&[FORM, &["2024-01-02 09:00:00", "Alice", "wk1", "Thursday"]]);
        let (plan, _) = run(&Table::default(), &form, &ledger);
        let update = &plan.updates[0];
        assert_eq!(update.cells[8], "captain");
        assert_eq!(update.cells[5], "FALSE");
    }

    #[test]
    fn sort_orders_sessions_by_label() {
        let mut t = table(&[
            LEDGER_HEADERS,
            &["Bob", "1", "", "Tues", "", "", "", ""],
            &["alice", "2", "", "Sat", "", "", "", ""],
            &["Bob", "1", "", "Sat", "", "", "", ""],
            &["Bob", "1", "", "Thurs", "", "", "", ""],
            &["Amy", "1", "", "Tues", "", "", "", ""],
            &["Zed", "", "", "Tues", "", "", "", ""],
        ]);
        sort_ledger(&mut t);
        let order: Vec<_> = events(&t).into_iter().map(|(w, n, e)| format!("{w}/{n}/{e}")).collect();
        assert_eq!(
            order,
            vec!["1/Amy/Tues", "1/Bob/Sat", "1/Bob/Thurs", "1/Bob/Tues", "2/alice/Sat", "/Zed/Tues"]
        );
    }

    #[test]
    fn missing_ledger_header_short_circuits() {
        let ledger = table(&[&["Name", "#", "Event"]]);
        let sched = schedule();
        let form = table(&[FORM]);
        let input = ReconInput {
            attendance_history: &Table::default(),
            schedule: &sched,
            form: &form,
            ledger: &ledger,
        };
        let err = reconcile(&input, now()).unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }
}
