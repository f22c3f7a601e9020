//! A workbook stored as a directory of `<Sheet>.csv` files.

use std::path::{Path, PathBuf};

use squadsheet_core::{Table, Workbook, WorkbookError};

use crate::csv;
use crate::error::IoError;

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    /// Sheet names present in the directory, sorted.
    pub fn sheet_names(&self) -> Result<Vec<String>, IoError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| IoError::Read {
            path: self.dir.clone(),
            source,
        })?;
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

impl Workbook for CsvWorkbook {
    fn table(&self, name: &str) -> Result<Option<Table>, WorkbookError> {
        let path = self.sheet_path(name);
        if !path.exists() {
            return Ok(None);
        }
        csv::import(&path).map(Some).map_err(|e| WorkbookError::Read {
            sheet: name.to_string(),
            message: e.to_string(),
        })
    }

    fn put_table(&mut self, name: &str, table: Table) -> Result<(), WorkbookError> {
        let write_err = |message: String| WorkbookError::Write {
            sheet: name.to_string(),
            message,
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| write_err(e.to_string()))?;
        csv::export(&table, &self.sheet_path(name)).map_err(|e| write_err(e.to_string()))?;
        log::debug!("wrote {} row(s) to {name}", table.rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_sheet_reads_as_none() {
        let dir = tempdir().unwrap();
        let book = CsvWorkbook::open(dir.path());
        assert!(book.table("Players").unwrap().is_none());
        let err = book.require("Players").unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Players' not found");
    }

    #[test]
    fn put_then_read() {
        let dir = tempdir().unwrap();
        let mut book = CsvWorkbook::open(dir.path().join("club"));
        let table = Table::from_rows(vec![
            vec!["Name".into(), "Phone".into()],
            vec!["Alice".into(), "07700 900000".into()],
        ]);
        book.put_table("Players", table.clone()).unwrap();
        assert_eq!(book.table("Players").unwrap(), Some(table));
        assert_eq!(book.sheet_names().unwrap(), vec!["Players"]);
    }
}
