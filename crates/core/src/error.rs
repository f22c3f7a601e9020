use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A header the code looks up by name is absent.
    #[error("sheet '{sheet}': missing column '{column}'")]
    MissingColumn { sheet: String, column: String },
    /// Invalid A1 reference.
    #[error("invalid cell reference '{0}'")]
    CellRef(String),
    /// A value in a required field could not be parsed.
    #[error("sheet '{sheet}', row {row}: cannot parse {field} '{value}'")]
    Parse {
        sheet: String,
        row: usize,
        field: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("sheet '{0}' not found")]
    MissingSheet(String),
    #[error("cannot read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },
    #[error("cannot write sheet '{sheet}': {message}")]
    Write { sheet: String, message: String },
}
