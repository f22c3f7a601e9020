//! The roster board: one row per player, one column per held session.

use chrono::NaiveDate;
use serde::Serialize;
use squadsheet_core::dates::{add_weeks, format_week};
use squadsheet_core::{Mark, Player, ScheduleWeek, Session, Table};

use crate::grid::AvailabilityGrid;

/// Header rows above the player rows.
pub const HEADER_ROWS: usize = 4;
/// 1-based sheet row where the private board's count rows start.
pub const COUNTS_ROW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardView {
    /// Coaches' board: the roster minus colts and long-term unavailable.
    Private,
    /// Shared export: every name on the ledger, no roster filtering.
    Public,
}

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub view: BoardView,
    /// Weeks whose match is further ahead than this are hidden.
    pub horizon_weeks: u32,
    /// Sheet rows kept in the public export, header rows included.
    pub max_rows: usize,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            view: BoardView::Private,
            horizon_weeks: 6,
            max_rows: 205,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekColumns {
    pub number: u32,
    pub week_commencing: NaiveDate,
    pub fixtures: String,
    pub sessions: Vec<Session>,
    /// Match already played or beyond the horizon.
    pub hidden: bool,
    /// Counted towards the Training/Games totals.
    pub counted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardRow {
    pub name: String,
    pub marks: Vec<Mark>,
    pub training: u32,
    pub games: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnCounts {
    pub available: Vec<usize>,
    pub unavailable: Vec<usize>,
    pub not_responded: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterBoard {
    pub view: BoardView,
    pub weeks: Vec<WeekColumns>,
    pub rows: Vec<BoardRow>,
    /// Private view only.
    pub counts: Option<ColumnCounts>,
}

impl RosterBoard {
    pub fn build(
        grid: &AvailabilityGrid,
        schedule: &[ScheduleWeek],
        players: &[Player],
        options: &BoardOptions,
        today: NaiveDate,
    ) -> Self {
        let horizon = add_weeks(today, options.horizon_weeks as i64);
        let count_cutoff = add_weeks(today, 1);

        let weeks: Vec<WeekColumns> = schedule
            .iter()
            .filter_map(|w| {
                let sessions: Vec<Session> = w.sessions().iter().collect();
                if sessions.is_empty() {
                    return None;
                }
                let match_date = w.effective_match_date();
                Some(WeekColumns {
                    number: w.number,
                    week_commencing: w.week_commencing,
                    fixtures: w.fixtures_text(" | "),
                    sessions,
                    hidden: match_date < today || match_date > horizon,
                    counted: match_date <= count_cutoff,
                })
            })
            .collect();

        let names: Vec<String> = match options.view {
            BoardView::Private => {
                let mut names: Vec<String> = players
                    .iter()
                    .filter(|p| p.is_selectable())
                    .map(|p| p.name.clone())
                    .collect();
                names.sort();
                names.dedup();
                names
            }
            BoardView::Public => grid.names().map(String::from).collect(),
        };

        let mut rows: Vec<BoardRow> = names
            .into_iter()
            .map(|name| board_row(grid, &weeks, name))
            .collect();

        let counts = match options.view {
            BoardView::Private => {
                // Sort on the first column of the first visible week.
                if let Some(col) = first_visible_column(&weeks) {
                    rows.sort_by(|a, b| {
                        mark_rank(a.marks[col])
                            .cmp(&mark_rank(b.marks[col]))
                            .then_with(|| a.name.cmp(&b.name))
                    });
                }
                Some(column_counts(&rows, column_total(&weeks)))
            }
            BoardView::Public => {
                rows.truncate(options.max_rows.saturating_sub(HEADER_ROWS));
                None
            }
        };

        log::info!(
            "{:?} board: {} player(s) across {} week(s)",
            options.view,
            rows.len(),
            weeks.len()
        );
        Self {
            view: options.view,
            weeks,
            rows,
            counts,
        }
    }

    /// 0-based sheet columns belonging to hidden weeks.
    pub fn hidden_columns(&self) -> Vec<usize> {
        let mut col = 1;
        let mut hidden = Vec::new();
        for week in &self.weeks {
            for _ in &week.sessions {
                if week.hidden {
                    hidden.push(col);
                }
                col += 1;
            }
        }
        hidden
    }

    /// Lay the board out as a sheet: four header rows, player rows, and for
    /// the private view the count rows from [`COUNTS_ROW`].
    pub fn to_table(&self) -> Table {
        let mut header = [
            vec!["Week".to_string()],
            vec!["Commencing".to_string()],
            vec!["Match".to_string()],
            vec!["Player".to_string()],
        ];
        for week in &self.weeks {
            for session in &week.sessions {
                header[0].push(format!("Week {}", week.number));
                header[1].push(format_week(week.week_commencing));
                header[2].push(week.fixtures.clone());
                header[3].push(session.label().to_string());
            }
        }
        header[0].extend([String::new(), String::new()]);
        header[1].extend([String::new(), String::new()]);
        header[2].extend(["Total".to_string(), String::new()]);
        header[3].extend(["Training".to_string(), "Games".to_string()]);

        let mut table = Table::from_rows(header.to_vec());
        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.marks.len() + 3);
            cells.push(row.name.clone());
            cells.extend(row.marks.iter().map(|m| m.symbol().to_string()));
            cells.push(row.training.to_string());
            cells.push(row.games.to_string());
            table.push_row(cells);
        }

        if let Some(counts) = &self.counts {
            let start = table.rows.len().max(COUNTS_ROW - 1);
            let labelled = [
                ("Available", &counts.available),
                ("Unavailable", &counts.unavailable),
                ("Not responded", &counts.not_responded),
            ];
            for (offset, (label, values)) in labelled.into_iter().enumerate() {
                let r = start + offset;
                table.set(r, 0, label);
                for (i, n) in values.iter().enumerate() {
                    table.set(r, i + 1, n.to_string());
                }
            }
        }
        table
    }
}

fn board_row(grid: &AvailabilityGrid, weeks: &[WeekColumns], name: String) -> BoardRow {
    let mut marks = Vec::new();
    let mut training = 0;
    let mut games = 0;
    for week in weeks {
        for &session in &week.sessions {
            let mark = grid.mark(&name, week.number, session);
            if week.counted && mark.is_yes() {
                if session.is_training() {
                    training += 1;
                } else {
                    games += 1;
                }
            }
            marks.push(mark);
        }
    }
    BoardRow {
        name,
        marks,
        training,
        games,
    }
}

fn column_total(weeks: &[WeekColumns]) -> usize {
    weeks.iter().map(|w| w.sessions.len()).sum()
}

fn first_visible_column(weeks: &[WeekColumns]) -> Option<usize> {
    let mut col = 0;
    for week in weeks {
        if !week.hidden {
            return Some(col);
        }
        col += week.sessions.len();
    }
    None
}

fn mark_rank(mark: Mark) -> u8 {
    match mark {
        Mark::Yes => 0,
        Mark::No => 1,
        Mark::Unknown => 2,
    }
}

fn column_counts(rows: &[BoardRow], columns: usize) -> ColumnCounts {
    let mut counts = ColumnCounts {
        available: vec![0; columns],
        unavailable: vec![0; columns],
        not_responded: vec![0; columns],
    };
    for row in rows {
        for (i, mark) in row.marks.iter().enumerate() {
            match mark {
                Mark::Yes => counts.available[i] += 1,
                Mark::No => counts.unavailable[i] += 1,
                Mark::Unknown => counts.not_responded[i] += 1,
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadsheet_core::LedgerRow;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn week(number: u32, wc: NaiveDate, tues: bool, thurs: bool, first: &str) -> ScheduleWeek {
        ScheduleWeek {
            number,
            week_commencing: wc,
            match_date: None,
            tues,
            thurs,
            first_fixture: first.into(),
            second_fixture: String::new(),
            label: String::new(),
        }
    }

    fn player(name: &str, colts: bool, unavailable: bool) -> Player {
        Player {
            name: name.into(),
            colts,
            unavailable,
            ..Player::default()
        }
    }

    fn entry(name: &str, week: u32, session: Session, available: Option<bool>) -> LedgerRow {
        LedgerRow {
            name: name.into(),
            week,
            week_commencing: None,
            session,
            date: None,
            available,
            attended: None,
            last_updated: None,
        }
    }

    fn schedule() -> Vec<ScheduleWeek> {
        vec![
            week(1, d(1, 1), true, true, "Ware"),
            week(2, d(1, 8), false, false, ""),
            week(3, d(1, 15), true, false, "Harlow"),
            week(4, d(3, 4), true, false, ""),
        ]
    }

    fn grid() -> AvailabilityGrid {
        AvailabilityGrid::from_rows([
            entry("Alice", 1, Session::Tues, Some(true)),
            entry("Alice", 1, Session::Sat, Some(true)),
            entry("Alice", 3, Session::Tues, Some(true)),
            entry("Bob", 3, Session::Tues, Some(false)),
            entry("Colin Colt", 3, Session::Sat, Some(true)),
            entry("Cara", 3, Session::Tues, Some(true)),
        ])
    }

    fn roster() -> Vec<Player> {
        vec![
            player("Bob", false, false),
            player("Alice", false, false),
            player("Cara", false, false),
            player("Colin Colt", true, false),
            player("Len Gone", false, true),
            player("Dee", false, false),
        ]
    }

    #[test]
    fn private_board_filters_sorts_and_counts() {
        // Week 1 is played, week 3 is the first visible.
        let today = d(1, 10);
        let board = RosterBoard::build(&grid(), &schedule(), &roster(), &BoardOptions::default(), today);

        let numbers: Vec<u32> = board.weeks.iter().map(|w| w.number).collect();
        assert_eq!(numbers, vec![1, 3, 4]);
        assert!(board.weeks[0].hidden);
        assert!(!board.weeks[1].hidden);
        assert!(board.weeks[2].hidden, "beyond the horizon");

        let names: Vec<&str> = board.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Cara", "Bob", "Dee"]);

        // Only week 1 is close enough to count.
        let alice = &board.rows[0];
        assert_eq!(alice.training, 1);
        assert_eq!(alice.games, 1);

        let counts = board.counts.as_ref().unwrap();
        // Columns: w1 Tues, w1 Thurs, w1 Sat, w3 Tues, w3 Sat, w4 Tues
        assert_eq!(counts.available, vec![1, 0, 1, 2, 0, 0]);
        assert_eq!(counts.unavailable, vec![0, 0, 0, 1, 0, 0]);
        assert_eq!(counts.not_responded, vec![3, 4, 3, 1, 4, 4]);
        assert_eq!(board.hidden_columns(), vec![1, 2, 3, 6]);
    }

    #[test]
    fn public_board_keeps_colts_and_truncates() {
        let options = BoardOptions {
            view: BoardView::Public,
            max_rows: 6,
            ..BoardOptions::default()
        };
        let board = RosterBoard::build(&grid(), &schedule(), &[], &options, d(1, 10));
        let names: Vec<&str> = board.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(board.counts.is_none());

        let options = BoardOptions {
            view: BoardView::Public,
            ..BoardOptions::default()
        };
        let board = RosterBoard::build(&grid(), &schedule(), &[], &options, d(1, 10));
        assert!(board.rows.iter().any(|r| r.name == "Colin Colt"));
    }

    #[test]
    fn table_layout() {
        let board = RosterBoard::build(&grid(), &schedule(), &roster(), &BoardOptions::default(), d(1, 10));
        let table = board.to_table();

        assert_eq!(table.cell(0, 1), "Week 1");
        assert_eq!(table.cell(1, 1), "1 Jan 24");
        assert_eq!(table.cell(2, 1), "1s v Ware");
        assert_eq!(table.cell(3, 3), "Sat");
        assert_eq!(table.cell(2, 7), "Total");
        assert_eq!(table.cell(3, 8), "Games");
        assert_eq!(table.cell(4, 0), "Alice");
        assert_eq!(table.cell(4, 1), "✔");
        assert_eq!(table.cell(4, 2), "");
        assert_eq!(table.cell(COUNTS_ROW - 1, 0), "Available");
        assert_eq!(table.cell(COUNTS_ROW + 1, 0), "Not responded");
        assert_eq!(table.cell(COUNTS_ROW - 1, 4), "2");
    }
}
