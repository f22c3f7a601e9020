//! Folding sign-up form responses into the Players sheet.

use std::collections::HashSet;

use squadsheet_core::model::parse_bool;
use squadsheet_core::{HeaderIndex, Table};

use crate::error::ReconError;

pub const PLAYERS_SHEET: &str = "Players";
pub const SIGNUP_SHEET: &str = "SignUpForm";

const FIRST_NAME: &str = "First Name";
const SECOND_NAME: &str = "Second Name";
const MOBILE: &str = "Mobile Number";
const POSITION: &str = "Preferred Playing Position";

#[derive(Debug, Clone)]
pub struct RosterMerge {
    pub table: Table,
    /// Full names of the players appended by this merge.
    pub added: Vec<String>,
}

/// Append sign-ups whose full name is not already on the roster
/// (case-insensitive), then re-sort the roster.
pub fn merge_signups(players: &Table, signups: &Table) -> Result<RosterMerge, ReconError> {
    if players.is_empty() {
        return Err(ReconError::EmptySheet(PLAYERS_SHEET.into()));
    }
    let pidx = players.index(PLAYERS_SHEET, &["Name"])?;
    let width = players.headers().len();

    let mut rows: Vec<Vec<String>> = players.data_rows().to_vec();
    let mut known: HashSet<String> = rows
        .iter()
        .map(|r| pidx.value(r, "Name").to_lowercase())
        .collect();
    let mut added = Vec::new();

    if signups.data_len() > 0 {
        let fidx = signups.index(SIGNUP_SHEET, &[FIRST_NAME, SECOND_NAME])?;
        for row in signups.data_rows() {
            let first = fidx.value(row, FIRST_NAME);
            let second = fidx.value(row, SECOND_NAME);
            if first.is_empty() || second.is_empty() {
                continue;
            }
            let full = format!("{first} {second}");
            if !known.insert(full.to_lowercase()) {
                continue;
            }

            let positions = fidx.value(row, POSITION);
            let mut new_row = vec![String::new(); width];
            let mut put = |column: &str, value: &str| {
                if let Some(i) = pidx.get(column) {
                    new_row[i] = value.to_string();
                }
            };
            put("Name", &full);
            put("Phone", fidx.value(row, MOBILE));
            put("Positions", positions);
            if !positions.contains(',') {
                put("Primary Position", positions);
            }
            log::info!("new player from sign-up: {full}");
            rows.push(new_row);
            added.push(full);
        }
    }

    rows.sort_by(|a, b| {
        roster_rank(&pidx, a)
            .cmp(&roster_rank(&pidx, b))
            .then_with(|| pidx.value(a, "Name").to_lowercase().cmp(&pidx.value(b, "Name").to_lowercase()))
    });

    let mut table = Table::from_rows(vec![players.headers().to_vec()]);
    for row in rows {
        table.push_row(row);
    }
    Ok(RosterMerge { table, added })
}

/// (availability, team, colts): fit before unavailable before injured;
/// 1st-only, both teams, 2nd-only, neither; seniors before colts.
fn roster_rank(idx: &HeaderIndex, row: &[String]) -> (u8, u8, u8) {
    let set = |column: &str| parse_bool(idx.value(row, column)) == Some(true);
    let availability = if set("Injured") {
        2
    } else if set("Unavailable") {
        1
    } else {
        0
    };
    let team = match (set("1st"), set("2nd")) {
        (true, false) => 0,
        (true, true) => 1,
        (false, true) => 2,
        (false, false) => 3,
    };
    (availability, team, u8::from(set("Colts")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const PLAYERS: &[&str] = &[
        "Name", "Phone", "Positions", "Primary Position", "1st", "2nd", "Colts", "Injured", "Unavailable",
    ];

    #[test]
    fn adds_new_names_and_sorts_by_rank() {
        let players = table(&[
            PLAYERS,
            &["Ian Jury", "", "Prop", "Prop", "TRUE", "", "", "TRUE", ""],
            &["Sam Both", "", "Centre", "Centre", "TRUE", "TRUE", "", "", ""],
            &["Fay First", "", "Hooker", "Hooker", "TRUE", "", "", "", ""],
        ]);
        let signups = table(&[
            &["Timestamp", FIRST_NAME, SECOND_NAME, MOBILE, POSITION],
            &["t", "fay", "first", "07", "Prop"],
            &["t", "Ned", "New", "0771", "Winger, Fullback"],
            &["t", "Una", "Single", "0772", "Flanker"],
            &["t", "Ned", "New", "0771", "Winger"],
            &["t", "NoSurname", "", "", ""],
        ]);

        let merged = merge_signups(&players, &signups).unwrap();
        assert_eq!(merged.added, vec!["Ned New", "Una Single"]);

        let names: Vec<&str> = merged.table.data_rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Fay First", "Sam Both", "Ned New", "Una Single", "Ian Jury"]);

        let ned = &merged.table.data_rows()[2];
        assert_eq!(ned[1], "0771");
        assert_eq!(ned[2], "Winger, Fullback");
        assert_eq!(ned[3], "");
        assert_eq!(merged.table.data_rows()[3][3], "Flanker");
    }

    #[test]
    fn empty_roster_sheet_is_an_error() {
        let err = merge_signups(&Table::default(), &Table::default()).unwrap_err();
        assert!(matches!(err, ReconError::EmptySheet(_)));
    }
}
