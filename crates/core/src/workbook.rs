use std::collections::BTreeMap;

use crate::error::WorkbookError;
use crate::table::Table;

/// The host spreadsheet: named sheets in, whole tables out.
pub trait Workbook {
    /// `Ok(None)` when the sheet does not exist.
    fn table(&self, name: &str) -> Result<Option<Table>, WorkbookError>;

    fn put_table(&mut self, name: &str, table: Table) -> Result<(), WorkbookError>;

    /// Read a sheet that must exist.
    fn require(&self, name: &str) -> Result<Table, WorkbookError> {
        self.table(name)?
            .ok_or_else(|| WorkbookError::MissingSheet(name.to_string()))
    }

    /// Read a sheet, treating a missing one as empty.
    fn table_or_empty(&self, name: &str) -> Result<Table, WorkbookError> {
        Ok(self.table(name)?.unwrap_or_default())
    }
}

/// In-memory workbook, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    pub sheets: BTreeMap<String, Table>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, table: Table) -> Self {
        self.sheets.insert(name.to_string(), table);
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn table(&self, name: &str) -> Result<Option<Table>, WorkbookError> {
        Ok(self.sheets.get(name).cloned())
    }

    fn put_table(&mut self, name: &str, table: Table) -> Result<(), WorkbookError> {
        self.sheets.insert(name.to_string(), table);
        Ok(())
    }
}
