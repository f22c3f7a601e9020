//! `CliError` and the mapping from each crate's errors to an exit code.

use std::fmt;

use squadsheet_board::BoardError;
use squadsheet_config::ConfigError;
use squadsheet_core::{CoreError, WorkbookError};
use squadsheet_dashboard::DashboardError;
use squadsheet_io::IoError;
use squadsheet_recon::ReconError;

use crate::exit_codes::*;

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// A missing sheet or header: logged and skipped unless `--strict`.
    pub fn is_schema(&self) -> bool {
        self.code == EXIT_SCHEMA
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match err {
            CoreError::MissingColumn { .. } => EXIT_SCHEMA,
            CoreError::CellRef(_) | CoreError::Parse { .. } => EXIT_PARSE,
        };
        Self::new(code, err.to_string())
    }
}

impl From<WorkbookError> for CliError {
    fn from(err: WorkbookError) -> Self {
        match err {
            WorkbookError::MissingSheet(ref name) => Self::new(EXIT_SCHEMA, err.to_string())
                .with_hint(format!("expected {name}.csv in the workbook directory")),
            WorkbookError::Read { .. } | WorkbookError::Write { .. } => Self::io(err.to_string()),
        }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Sheet(e) => e.into(),
            ReconError::EmptySheet(_) => Self::new(EXIT_SCHEMA, err.to_string()),
            ReconError::NotTrainingDay(_) => Self::input(err.to_string()),
        }
    }
}

impl From<BoardError> for CliError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Sheet(e) => e.into(),
            BoardError::NoWeekSelected(_) => {
                Self::input(err.to_string()).with_hint("pick a week from the Selection dropdown (A2)")
            }
            BoardError::BadDate(_) | BoardError::NotTrainingDay(_) => {
                Self::input(err.to_string()).with_hint("run `squad attendance dates` for valid dates")
            }
            BoardError::UnknownFilter(_) => Self::input(err.to_string()),
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Csv { .. } | IoError::Json { .. } => Self::parse(err.to_string()),
            IoError::Read { .. } | IoError::Write { .. } => Self::io(err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Read { .. } | ConfigError::Write { .. } => Self::io(err.to_string()),
            ConfigError::Parse(_) | ConfigError::Invalid(_) | ConfigError::Serialize(_) => {
                Self::args(err.to_string()).with_hint("check the settings file, or pass --config")
            }
        }
    }
}

impl From<DashboardError> for CliError {
    fn from(err: DashboardError) -> Self {
        let code = match err {
            DashboardError::Io(_) | DashboardError::MissingSpec(_) => EXIT_DASHBOARD_SPEC,
            DashboardError::UnknownChart(_) => EXIT_DASHBOARD_CHART,
            DashboardError::NotAnObject(_) => EXIT_DASHBOARD_SHAPE,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_errors_map_to_codes() {
        let missing: CliError = WorkbookError::MissingSheet("Schedule".into()).into();
        assert_eq!(missing.code, EXIT_SCHEMA);
        assert!(missing.is_schema());
        assert!(missing.hint.unwrap().contains("Schedule.csv"));

        let col: CliError = CoreError::MissingColumn { sheet: "Players".into(), column: "Name".into() }.into();
        assert_eq!(col.code, EXIT_SCHEMA);
    }

    #[test]
    fn input_errors() {
        let err: CliError = BoardError::NoWeekSelected("nothing".into()).into();
        assert_eq!(err.code, EXIT_INPUT);
        let err: CliError = DashboardError::UnknownChart("league".into()).into();
        assert_eq!(err.code, EXIT_DASHBOARD_CHART);
    }
}
