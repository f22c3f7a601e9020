//! Choices offered by the availability form: upcoming weeks and player names.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;
use squadsheet_core::dates::day_suffix;
use squadsheet_core::{Player, ScheduleWeek, Table};
use squadsheet_core::model::WEEK_LABEL_COLUMN;

use crate::error::BoardError;

/// Saturday of the week, 17:00: the form stops offering a week after this.
fn cutoff(week: &ScheduleWeek) -> NaiveDateTime {
    (week.week_commencing + Duration::days(5)).and_time(NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// `w/c 2nd Sep: 1s v Ware, 2s v Harlow - 7 Sep`, or `w/c 9th Sep: no games`.
pub fn week_label(week: &ScheduleWeek) -> String {
    let wc = week.week_commencing;
    let head = format!("w/c {}{} {}", wc.day(), day_suffix(wc.day()), wc.format("%b"));
    if !week.has_fixture() {
        return format!("{head}: no games");
    }
    let date = week
        .match_date
        .map(|d| format!(" - {}", d.format("%-d %b")))
        .unwrap_or_default();
    format!("{head}: {}{date}", week.fixtures_text(", "))
}

/// Labels for the current week and every later one, in schedule order.
pub fn week_labels(weeks: &[ScheduleWeek], now: NaiveDateTime) -> Vec<String> {
    weeks
        .iter()
        .filter(|w| now <= cutoff(w))
        .map(week_label)
        .collect()
}

/// Rewrite the schedule's label column: blank for finished weeks.
/// Returns the labels written, in order.
pub fn apply_week_labels(sheet: &str, schedule: &mut Table, now: NaiveDateTime) -> Result<Vec<String>, BoardError> {
    let weeks = ScheduleWeek::parse_table(sheet, schedule)?;
    let col = match schedule.column(WEEK_LABEL_COLUMN) {
        Some(c) => c,
        None => {
            let c = schedule.headers().len();
            schedule.set(0, c, WEEK_LABEL_COLUMN);
            c
        }
    };
    let number_col = schedule.column("#");

    let mut labels = Vec::new();
    for row in 1..schedule.rows.len() {
        let number = number_col.and_then(|c| schedule.cell(row, c).parse::<u32>().ok());
        let label = number
            .and_then(|n| weeks.iter().find(|w| w.number == n))
            .filter(|w| now <= cutoff(w))
            .map(week_label)
            .unwrap_or_default();
        if !label.is_empty() {
            labels.push(label.clone());
        }
        schedule.set(row, col, label);
    }
    log::debug!("{sheet}: {} week labels", labels.len());
    Ok(labels)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormChoices {
    pub weeks: Vec<String>,
    pub names: Vec<String>,
}

/// The first `week_limit` labels and every roster name, sorted.
pub fn form_choices(labels: &[String], players: &[Player], week_limit: usize) -> FormChoices {
    let mut names: Vec<String> = players.iter().map(|p| p.name.clone()).collect();
    names.sort();
    names.dedup();
    FormChoices {
        weeks: labels.iter().take(week_limit).cloned().collect(),
        names,
    }
}
