//! Depth chart: who can cover each position, best option first.

use std::str::FromStr;

use serde::Serialize;
use squadsheet_core::{Player, Table};

use crate::error::BoardError;
use crate::selection::POSITION_ORDER;

/// Rows per position block on the sheet.
const BLOCK_ROWS: usize = 26;
/// 0-based first row of the forwards and backs blocks.
const BLOCK_STARTS: [usize; 2] = [2, 29];
/// Column B.
const FIRST_COL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SquadFilter {
    Squad,
    FirstXv,
    SecondXv,
    Colts,
}

impl FromStr for SquadFilter {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "Squad" => Ok(Self::Squad),
            "1st XV" => Ok(Self::FirstXv),
            "2nd XV" => Ok(Self::SecondXv),
            "Colts" => Ok(Self::Colts),
            other => Err(BoardError::UnknownFilter(other.to_string())),
        }
    }
}

impl SquadFilter {
    pub fn admits(&self, player: &Player) -> bool {
        match self {
            Self::Squad => true,
            Self::FirstXv => player.first,
            Self::SecondXv => player.second,
            Self::Colts => player.colts,
        }
    }
}

/// Listing order within a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Primary,
    Backup,
    Unavailable,
    Injured,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionColumn {
    pub position: &'static str,
    pub players: Vec<(String, PositionStatus)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionsBoard {
    pub filter: SquadFilter,
    pub columns: Vec<PositionColumn>,
}

impl PositionsBoard {
    pub fn build(players: &[Player], filter: SquadFilter) -> Self {
        let mut columns: Vec<PositionColumn> = POSITION_ORDER
            .iter()
            .map(|&position| PositionColumn {
                position,
                players: Vec::new(),
            })
            .collect();

        for player in players.iter().filter(|p| filter.admits(p)) {
            for pos in &player.positions {
                let Some(column) = columns.iter_mut().find(|c| c.position == pos.as_str()) else {
                    continue;
                };
                let status = if player.injured {
                    PositionStatus::Injured
                } else if player.unavailable {
                    PositionStatus::Unavailable
                } else if player.primary_position == *pos {
                    PositionStatus::Primary
                } else {
                    PositionStatus::Backup
                };
                column.players.push((player.name.clone(), status));
            }
        }

        for column in &mut columns {
            column
                .players
                .sort_by(|(a, sa), (b, sb)| sa.cmp(sb).then_with(|| a.cmp(b)));
        }
        Self { filter, columns }
    }

    /// Forwards in B3:F28, backs in B30:F55.
    pub fn render_into(&self, sheet: &mut Table) {
        for (block, chunk) in self.columns.chunks(5).enumerate() {
            let top = BLOCK_STARTS[block.min(1)];
            for row in top..top + BLOCK_ROWS {
                for col in FIRST_COL..FIRST_COL + 5 {
                    if !sheet.cell(row, col).is_empty() {
                        sheet.set(row, col, "");
                    }
                }
            }
            for (i, column) in chunk.iter().enumerate() {
                if column.players.len() > BLOCK_ROWS {
                    log::warn!(
                        "{}: {} players, only {BLOCK_ROWS} fit",
                        column.position,
                        column.players.len()
                    );
                }
                for (r, (name, _)) in column.players.iter().take(BLOCK_ROWS).enumerate() {
                    sheet.set(top + r, FIRST_COL + i, name.clone());
                }
            }
        }
    }
}
