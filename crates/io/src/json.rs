// JSON read/write: chart specifications and table exports

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use squadsheet_core::Table;

use crate::error::IoError;

/// Read and parse a JSON file (chart specs, the panel flag).
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let file = File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| IoError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn write_pretty<T: Serialize>(value: &T, path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| write_err(e.to_string()))
}

/// Export a table as a JSON array of arrays, trailing empty cells and rows trimmed.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    let mut rows: Vec<&[String]> = table
        .rows
        .iter()
        .map(|row| {
            let end = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
            &row[..end]
        })
        .collect();
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    write_pretty(&rows, path)
}
