use std::collections::{BTreeMap, HashMap};

use squadsheet_core::{effective_availability, LedgerRow, Mark, Session, Table};

use crate::error::BoardError;

/// Effective availability per player, week and session, read from the ledger.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityGrid {
    cells: BTreeMap<String, HashMap<(u32, Session), Option<bool>>>,
}

impl AvailabilityGrid {
    /// An empty ledger gives an empty grid.
    pub fn from_ledger(sheet: &str, ledger: &Table) -> Result<Self, BoardError> {
        if ledger.data_len() == 0 {
            return Ok(Self::default());
        }
        Ok(Self::from_rows(LedgerRow::parse_table(sheet, ledger)?))
    }

    pub fn from_rows(rows: impl IntoIterator<Item = LedgerRow>) -> Self {
        let mut cells: BTreeMap<String, HashMap<(u32, Session), Option<bool>>> = BTreeMap::new();
        for row in rows {
            cells.entry(row.name.clone()).or_default().insert(
                (row.week, row.session),
                effective_availability(row.attended, row.available),
            );
        }
        Self { cells }
    }

    /// `None` when the player has no ledger row for that session.
    pub fn get(&self, name: &str, week: u32, session: Session) -> Option<Option<bool>> {
        self.cells.get(name)?.get(&(week, session)).copied()
    }

    pub fn mark(&self, name: &str, week: u32, session: Session) -> Mark {
        Mark::from(self.get(name, week, session).flatten())
    }

    /// Every name on the ledger, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Names with at least one row in `week`, sorted.
    pub fn names_in_week(&self, week: u32) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .filter(move |(_, sessions)| sessions.keys().any(|(w, _)| *w == week))
            .map(|(name, _)| name.as_str())
    }

    pub fn has_week(&self, week: u32) -> bool {
        self.cells
            .values()
            .any(|sessions| sessions.keys().any(|(w, _)| *w == week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, week: u32, session: Session, available: Option<bool>, attended: Option<bool>) -> LedgerRow {
        LedgerRow {
            name: name.into(),
            week,
            week_commencing: None,
            session,
            date: None,
            available,
            attended,
            last_updated: None,
        }
    }

    #[test]
    fn attended_wins_over_available() {
        let grid = AvailabilityGrid::from_rows([
            row("Alice", 1, Session::Tues, Some(true), Some(false)),
            row("Alice", 1, Session::Sat, Some(true), None),
            row("Bob", 2, Session::Tues, None, None),
        ]);
        assert_eq!(grid.mark("Alice", 1, Session::Tues), Mark::No);
        assert_eq!(grid.mark("Alice", 1, Session::Sat), Mark::Yes);
        assert_eq!(grid.get("Bob", 2, Session::Tues), Some(None));
        assert_eq!(grid.get("Bob", 1, Session::Tues), None);
        assert_eq!(grid.names_in_week(2).collect::<Vec<_>>(), vec!["Bob"]);
        assert!(!grid.has_week(3));
    }
}
