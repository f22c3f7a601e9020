use squadsheet_io::IoError;
use thiserror::Error;

use crate::catalog::ChartKind;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("no spec loaded for {0}")]
    MissingSpec(ChartKind),
    /// Specs must be JSON objects so a transform list can be attached.
    #[error("{0}: spec is not a JSON object")]
    NotAnObject(String),
    #[error("unknown chart '{0}'")]
    UnknownChart(String),
}
