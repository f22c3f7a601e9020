use serde::Serialize;
use squadsheet_core::Table;

pub const SCHEDULE_SHEET: &str = "Schedule";
pub const FORM_SHEET: &str = "AvailabilityForm";
pub const LEDGER_SHEET: &str = "AvailabilityLatest";
pub const ATTENDANCE_SHEET: &str = "AttendanceHistory";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The four tables the reconciler reads, as loaded from the workbook.
#[derive(Debug, Clone, Copy)]
pub struct ReconInput<'a> {
    pub attendance_history: &'a Table,
    pub schedule: &'a Table,
    pub form: &'a Table,
    /// The current ledger, read before the merge.
    pub ledger: &'a Table,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Replace data row `row` (0-based, below the header) with `cells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowUpdate {
    pub row: usize,
    pub cells: Vec<String>,
}

/// Write instructions for the ledger. Empty means nothing to write.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerPlan {
    /// Header row the cells are laid out against.
    pub headers: Vec<String>,
    /// True when the ledger had no header row and one must be written.
    pub write_headers: bool,
    pub updates: Vec<RowUpdate>,
    pub inserts: Vec<Vec<String>>,
    /// Earlier duplicates of a key, dropped in favour of the last occurrence.
    pub removals: Vec<usize>,
    pub summary: ReconSummary,
}

impl LedgerPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.removals.is_empty() && !self.write_headers
    }

    pub fn write_count(&self) -> usize {
        self.updates.len() + self.inserts.len() + self.removals.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub submissions: usize,
    /// Latest submissions whose week label is not on the schedule.
    pub unscheduled_submissions: usize,
    /// Sessions a submission claimed that the week does not hold.
    pub skipped_sessions: usize,
    pub attendance_refreshes: usize,
    pub attendance_only_inserts: usize,
    pub updates: usize,
    pub inserts: usize,
    pub removals: usize,
}
