use chrono::NaiveDate;
use squadsheet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// A header or value problem in one of the source sheets.
    #[error(transparent)]
    Sheet(#[from] CoreError),
    /// A source sheet has no header row to work from.
    #[error("sheet '{0}' is empty")]
    EmptySheet(String),
    /// Attendance can only be recorded for Tuesday or Thursday training.
    #[error("{0} is not a training day (Tues/Thurs)")]
    NotTrainingDay(NaiveDate),
}
