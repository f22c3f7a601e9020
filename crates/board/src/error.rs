use chrono::NaiveDate;
use squadsheet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Sheet(#[from] CoreError),
    /// The selection cell does not contain `Week N`.
    #[error("'{0}' does not name a week (expected 'Week N')")]
    NoWeekSelected(String),
    #[error("'{0}' is not a date")]
    BadDate(String),
    /// Attendance is only taken at Tuesday and Thursday training.
    #[error("{0} is not a training day (Tues/Thurs)")]
    NotTrainingDay(NaiveDate),
    #[error("unknown squad filter '{0}' (expected Squad, 1st XV, 2nd XV or Colts)")]
    UnknownFilter(String),
}
