//! The team-selection sheet for one match week.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use squadsheet_core::{CellRef, Mark, Player, ScheduleWeek, Session, Table};

use crate::error::BoardError;
use crate::grid::AvailabilityGrid;

/// Position blocks on the grouped view, top to bottom.
pub const POSITION_ORDER: [&str; 10] = [
    "Prop",
    "Hooker",
    "Second Row",
    "Flanker",
    "Number 8",
    "Scrum Half",
    "Fly Half",
    "Centre",
    "Winger",
    "Fullback",
];

const SELECTED_WEEK: CellRef = CellRef::new(1, 0); // A2
const TABLE_HEADER_ROW: usize = 3;
const FIRST_ROW: usize = 4;
const POSITION_COL: usize = 9; // J
const PLAYER_COL: usize = 10; // K
const MARKER_COL: usize = 11; // L
const MIN_BLOCK: usize = 2;

/// Roster keyed by lowercased name; ledger names match case-insensitively.
fn roster_by_name(players: &[Player]) -> HashMap<String, &Player> {
    players.iter().map(|p| (p.name.to_lowercase(), p)).collect()
}

const HEADERS: [&str; 8] = [
    "Name",
    "Tues",
    "Thurs",
    "Sat",
    "Primary Position",
    "Positions",
    "1st",
    "2nd",
];

/// Week number out of a dropdown label such as `Week 7: 1s v Ware`.
pub fn week_number(label: &str) -> Result<u32, BoardError> {
    static WEEK: OnceLock<Regex> = OnceLock::new();
    let re = WEEK.get_or_init(|| Regex::new(r"Week (\d+)").expect("valid regex"));
    re.captures(label)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| BoardError::NoWeekSelected(label.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRow {
    pub name: String,
    pub tues: Mark,
    pub thurs: Mark,
    pub sat: Mark,
    pub primary_position: String,
    pub positions: String,
    pub first: Mark,
    pub second: Mark,
}

impl SelectionRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.tues.symbol().into(),
            self.thurs.symbol().into(),
            self.sat.symbol().into(),
            self.primary_position.clone(),
            self.positions.clone(),
            self.first.symbol().into(),
            self.second.symbol().into(),
        ]
    }
}

/// How much of the week's training a Saturday-available player made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMarker {
    Both,
    ThursOnly,
    TuesOnly,
    None,
}

impl TrainingMarker {
    fn from_flags(tues: bool, thurs: bool) -> Self {
        match (tues, thurs) {
            (true, true) => Self::Both,
            (false, true) => Self::ThursOnly,
            (true, false) => Self::TuesOnly,
            (false, false) => Self::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::ThursOnly => "Thurs only",
            Self::TuesOnly => "Tues only",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionGroup {
    pub position: &'static str,
    pub players: Vec<(String, TrainingMarker)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionSheet {
    pub label: String,
    pub week: u32,
    pub rows: Vec<SelectionRow>,
    pub groups: Vec<PositionGroup>,
}

impl SelectionSheet {
    /// Players with a ledger row in the selected week, colts and long-term
    /// unavailable left out. A session with no row shows ✘.
    pub fn build(players: &[Player], grid: &AvailabilityGrid, week_label: &str) -> Result<Self, BoardError> {
        let week = week_number(week_label)?;
        let roster = roster_by_name(players);

        let mut rows: Vec<SelectionRow> = grid
            .names_in_week(week)
            .filter(|name| roster.get(&name.to_lowercase()).map_or(true, |p| p.is_selectable()))
            .map(|name| {
                let info = roster.get(&name.to_lowercase());
                let mark = |session| {
                    grid.get(name, week, session)
                        .map(Mark::from)
                        .unwrap_or(Mark::No)
                };
                SelectionRow {
                    name: name.to_string(),
                    tues: mark(Session::Tues),
                    thurs: mark(Session::Thurs),
                    sat: mark(Session::Sat),
                    primary_position: info.map(|p| p.primary_position.clone()).unwrap_or_default(),
                    positions: info.map(|p| p.positions.join(", ")).unwrap_or_default(),
                    first: Mark::from(info.map(|p| p.first)),
                    second: Mark::from(info.map(|p| p.second)),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.sat
                .is_yes()
                .cmp(&a.sat.is_yes())
                .then_with(|| b.thurs.is_yes().cmp(&a.thurs.is_yes()))
                .then_with(|| b.tues.is_yes().cmp(&a.tues.is_yes()))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(Self {
            label: week_label.to_string(),
            week,
            rows,
            groups: available_by_position(players, grid, week),
        })
    }

    /// Write the selection into the layout sheet: A2 holds the week, the
    /// table starts at A4, the grouped view at J3.
    pub fn render_into(&self, sheet: &mut Table) {
        sheet.set_a1(SELECTED_WEEK, self.label.clone());
        for (col, h) in HEADERS.iter().enumerate() {
            sheet.set(TABLE_HEADER_ROW, col, *h);
        }
        for row in sheet.rows.iter_mut().skip(FIRST_ROW) {
            for cell in row.iter_mut().take(MARKER_COL + 1) {
                cell.clear();
            }
        }

        for (i, row) in self.rows.iter().enumerate() {
            for (col, value) in row.cells().into_iter().enumerate() {
                sheet.set(FIRST_ROW + i, col, value);
            }
        }

        sheet.set(2, POSITION_COL, "Available Players");
        let mut r = FIRST_ROW;
        for group in &self.groups {
            sheet.set(r, POSITION_COL, group.position);
            for (i, (name, marker)) in group.players.iter().enumerate() {
                sheet.set(r + i, PLAYER_COL, name.clone());
                sheet.set(r + i, MARKER_COL, marker.label());
            }
            r += group.players.len().max(MIN_BLOCK);
        }
    }
}

/// Saturday-available players of `week` grouped by primary position, in
/// [`POSITION_ORDER`]. Every position gets a group, possibly empty.
pub fn available_by_position(players: &[Player], grid: &AvailabilityGrid, week: u32) -> Vec<PositionGroup> {
    let roster = roster_by_name(players);
    let mut by_position: HashMap<&str, Vec<(String, TrainingMarker)>> = HashMap::new();

    for name in grid.names_in_week(week) {
        let Some(player) = roster.get(&name.to_lowercase()) else { continue };
        if !player.is_selectable() {
            continue;
        }
        let yes = |session| grid.get(name, week, session).flatten() == Some(true);
        if !yes(Session::Sat) {
            continue;
        }
        by_position
            .entry(player.primary_position.as_str())
            .or_default()
            .push((name.to_string(), TrainingMarker::from_flags(yes(Session::Tues), yes(Session::Thurs))));
    }

    POSITION_ORDER
        .iter()
        .map(|&position| PositionGroup {
            position,
            players: by_position.remove(position).unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOptions {
    pub options: Vec<String>,
    /// The value A2 should hold after the refresh; empty when no week qualifies.
    pub selected: String,
}

/// Dropdown labels for weeks with a fixture, a match still to come, and at
/// least one ledger response. The current choice survives if still offered.
pub fn selection_options(
    schedule: &[ScheduleWeek],
    grid: &AvailabilityGrid,
    today: NaiveDate,
    current: &str,
) -> SelectionOptions {
    let options: Vec<String> = schedule
        .iter()
        .filter(|w| w.has_fixture() && w.effective_match_date() >= today && grid.has_week(w.number))
        .map(|w| format!("Week {}: {}", w.number, w.fixtures_text(" | ")))
        .collect();
    let selected = if options.iter().any(|o| o == current) {
        current.to_string()
    } else {
        options.first().cloned().unwrap_or_default()
    };
    SelectionOptions { options, selected }
}
