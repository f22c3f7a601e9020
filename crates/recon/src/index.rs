use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use squadsheet_core::dates::parse_timestamp;
use squadsheet_core::model::{FORM_NAME, FORM_SELECTION, FORM_TIMESTAMP, FORM_WEEK};
use squadsheet_core::{
    AttendanceEntry, AttendanceKey, FormSubmission, ScheduleWeek, SubmissionKey, Table,
};

use crate::error::ReconError;
use crate::model::{ATTENDANCE_SHEET, FORM_SHEET, SCHEDULE_SHEET};

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Schedule weeks looked up by form label, week-commencing date, or number.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    weeks: Vec<ScheduleWeek>,
    by_label: HashMap<String, usize>,
    by_commencing: HashMap<NaiveDate, usize>,
    by_number: HashMap<u32, usize>,
}

impl ScheduleIndex {
    pub fn from_table(table: &Table) -> Result<Self, ReconError> {
        if table.is_empty() {
            return Err(ReconError::EmptySheet(SCHEDULE_SHEET.into()));
        }
        Ok(Self::from_weeks(ScheduleWeek::parse_table(SCHEDULE_SHEET, table)?))
    }

    pub fn from_weeks(weeks: Vec<ScheduleWeek>) -> Self {
        let mut by_label = HashMap::new();
        let mut by_commencing = HashMap::new();
        let mut by_number = HashMap::new();
        for (i, w) in weeks.iter().enumerate() {
            if !w.label.is_empty() {
                by_label.insert(w.label.clone(), i);
            }
            by_commencing.entry(w.week_commencing).or_insert(i);
            by_number.entry(w.number).or_insert(i);
        }
        Self {
            weeks,
            by_label,
            by_commencing,
            by_number,
        }
    }

    pub fn by_label(&self, label: &str) -> Option<&ScheduleWeek> {
        self.by_label.get(label.trim()).map(|&i| &self.weeks[i])
    }

    pub fn by_commencing(&self, date: NaiveDate) -> Option<&ScheduleWeek> {
        self.by_commencing.get(&date).map(|&i| &self.weeks[i])
    }

    pub fn by_number(&self, number: u32) -> Option<&ScheduleWeek> {
        self.by_number.get(&number).map(|&i| &self.weeks[i])
    }

    pub fn weeks(&self) -> &[ScheduleWeek] {
        &self.weeks
    }
}

// ---------------------------------------------------------------------------
// Form submissions
// ---------------------------------------------------------------------------

/// Latest submission per (player, week label).
#[derive(Debug, Clone, Default)]
pub struct SubmissionIndex {
    latest: BTreeMap<SubmissionKey, FormSubmission>,
}

impl SubmissionIndex {
    /// An empty form sheet yields an empty index. Rows without a name,
    /// label or readable timestamp are skipped.
    pub fn from_table(table: &Table) -> Result<Self, ReconError> {
        if table.is_empty() {
            log::info!("{FORM_SHEET} has no rows");
            return Ok(Self::default());
        }
        let idx = table.index(FORM_SHEET, &[FORM_TIMESTAMP, FORM_NAME, FORM_WEEK, FORM_SELECTION])?;

        let mut index = Self::default();
        for (i, row) in table.data_rows().iter().enumerate() {
            let name = idx.value(row, FORM_NAME);
            let week_label = idx.value(row, FORM_WEEK);
            if name.is_empty() || week_label.is_empty() {
                continue;
            }
            let raw_ts = idx.value(row, FORM_TIMESTAMP);
            let Some(timestamp) = parse_timestamp(raw_ts) else {
                log::warn!("{FORM_SHEET} row {}: unreadable timestamp '{raw_ts}', skipped", i + 2);
                continue;
            };
            index.insert(FormSubmission {
                timestamp,
                name: name.to_string(),
                week_label: week_label.to_string(),
                selection: idx.value(row, FORM_SELECTION).to_string(),
            });
        }
        Ok(index)
    }

    /// Keep `sub` unless a strictly newer submission for the same pair is held.
    /// Equal timestamps: the one seen last wins.
    pub fn insert(&mut self, sub: FormSubmission) {
        let key = sub.key();
        match self.latest.get(&key) {
            Some(held) if held.timestamp > sub.timestamp => {}
            _ => {
                self.latest.insert(key, sub);
            }
        }
    }

    pub fn get(&self, key: &SubmissionKey) -> Option<&FormSubmission> {
        self.latest.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormSubmission> {
        self.latest.values()
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Attendance history
// ---------------------------------------------------------------------------

/// Attendance per (player, week commencing, session).
///
/// A later row for the same key replaces an earlier one outright; there is
/// no timestamp comparison.
#[derive(Debug, Clone, Default)]
pub struct AttendanceIndex {
    entries: BTreeMap<AttendanceKey, AttendanceEntry>,
}

impl AttendanceIndex {
    pub fn from_table(table: &Table) -> Result<Self, ReconError> {
        if table.data_len() == 0 {
            return Ok(Self::default());
        }
        let mut index = Self::default();
        for entry in AttendanceEntry::parse_table(ATTENDANCE_SHEET, table)? {
            index.insert(entry);
        }
        Ok(index)
    }

    pub fn insert(&mut self, entry: AttendanceEntry) {
        self.entries.insert(entry.key(), entry);
    }

    pub fn get(&self, key: &AttendanceKey) -> Option<&AttendanceEntry> {
        self.entries.get(key)
    }

    /// Recorded attendance for `key`, ignoring entries whose cell is blank.
    pub fn attended(&self, key: &AttendanceKey) -> Option<bool> {
        self.entries.get(key).and_then(|e| e.attended)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttendanceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadsheet_core::Session;

    fn table(rows: &[&[&str]]) -> Table {
        Table::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const FORM_HEADERS: &[&str] = &[FORM_TIMESTAMP, FORM_NAME, FORM_WEEK, FORM_SELECTION];

    #[test]
    fn latest_submission_wins() {
        let t = table(&[
            FORM_HEADERS,
            &["2024-01-02 10:00:00", "Alice", "w/c 1st Jan", "Tuesday"],
            &["2024-01-03 10:00:00", "Alice", "w/c 1st Jan", "Thursday"],
            &["2024-01-01 10:00:00", "Alice", "w/c 1st Jan", "Saturday"],
        ]);
        let idx = SubmissionIndex::from_table(&t).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.iter().next().unwrap().selection, "Thursday");
    }

    #[test]
    fn equal_timestamps_last_seen_wins() {
        let t = table(&[
            FORM_HEADERS,
            &["2024-01-02 10:00:00", "Alice", "w/c 1st Jan", "Tuesday"],
            &["2024-01-02 10:00:00", "Alice", "w/c 1st Jan", "Thursday"],
        ]);
        let idx = SubmissionIndex::from_table(&t).unwrap();
        assert_eq!(idx.iter().next().unwrap().selection, "Thursday");
    }

    #[test]
    fn blank_and_unreadable_rows_skipped() {
        let t = table(&[
            FORM_HEADERS,
            &["2024-01-02 10:00:00", "", "w/c 1st Jan", "Tuesday"],
            &["not a time", "Bob", "w/c 1st Jan", "Tuesday"],
            &["2024-01-02 10:00:00", "Cara", "", "Tuesday"],
        ]);
        assert!(SubmissionIndex::from_table(&t).unwrap().is_empty());
    }

    #[test]
    fn form_missing_header_is_an_error() {
        let t = table(&[&[FORM_TIMESTAMP, FORM_NAME, FORM_WEEK]]);
        let err = SubmissionIndex::from_table(&t).unwrap_err();
        assert!(err.to_string().contains(FORM_SELECTION));
    }

    #[test]
    fn attendance_last_write_wins_regardless_of_stamp() {
        let t = table(&[
            &["#", "Week commencing", "Name", "Session", "Attended", "Date", "Last updated"],
            &["1", "1 Jan 24", "Alice", "Tues", "TRUE", "2024-01-02", "2024-01-05 10:00:00"],
            &["1", "1 Jan 24", "Alice", "Tues", "FALSE", "2024-01-02", "2024-01-02 10:00:00"],
        ]);
        let idx = AttendanceIndex::from_table(&t).unwrap();
        let key = AttendanceKey {
            name: "Alice".into(),
            week_commencing: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            session: Session::Tues,
        };
        assert_eq!(idx.attended(&key), Some(false));
    }

    #[test]
    fn schedule_lookup_by_label() {
        let t = table(&[
            &["#", "Week commencing", "Tues", "Thurs", "Match Date", "1st", "2nd", "Week Label"],
            &["1", "2024-01-01", "TRUE", "FALSE", "2024-01-06", "Ware", "", "w/c 1st Jan: 1s v Ware - 6 Jan"],
        ]);
        let idx = ScheduleIndex::from_table(&t).unwrap();
        let w = idx.by_label("w/c 1st Jan: 1s v Ware - 6 Jan").unwrap();
        assert_eq!(w.number, 1);
        assert!(idx.by_number(1).is_some());
        assert!(idx.by_label("w/c 8th Jan: no games").is_none());
    }

    #[test]
    fn empty_schedule_is_an_error() {
        assert!(matches!(
            ScheduleIndex::from_table(&Table::default()),
            Err(ReconError::EmptySheet(_))
        ));
    }
}
