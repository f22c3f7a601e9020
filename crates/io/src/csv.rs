// CSV import/export for workbook sheets

use std::path::Path;

use squadsheet_core::Table;

use crate::error::IoError;

/// Read a sheet. Workbook sheets are always comma-separated.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode(path, bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()
        .map_err(|e| IoError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(Table::from_rows(rows))
}

/// UTF-8 with any BOM dropped; anything else is taken as Windows-1252.
fn decode(path: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s),
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            encoding_rs::WINDOWS_1252.decode(e.as_bytes()).0.into_owned()
        }
    }
}

/// Write every row, trailing empty cells trimmed. Blank rows are kept so
/// A1 positions on layout sheets survive a round trip.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| write_err(e.to_string()))?;

    for row in &table.rows {
        let result = match row.iter().rposition(|c| !c.is_empty()) {
            Some(last) => writer.write_record(&row[..=last]),
            // A lone empty field, so the reader doesn't skip the line
            None => writer.write_record([""]),
        };
        result.map_err(|e| write_err(e.to_string()))?;
    }

    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_commas_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Schedule.csv");
        fs::write(
            &path,
            "#;Week Label\n1,\"w/c 1st Jan: 1s v Ware, 2s v Harlow - 6 Jan\"\n",
        )
        .unwrap();
        let table = import(&path).unwrap();
        assert_eq!(table.cell(0, 0), "#;Week Label");
        assert_eq!(table.cell(1, 1), "w/c 1st Jan: 1s v Ware, 2s v Harlow - 6 Jan");
    }

    #[test]
    fn test_bom_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Players.csv");
        fs::write(&path, "\u{feff}Name\nAlice\n").unwrap();
        assert_eq!(import(&path).unwrap().cell(0, 0), "Name");
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Players.csv");
        // "Zoë" in Windows-1252
        fs::write(&path, b"Name\nZo\xEB\n").unwrap();
        let table = import(&path).unwrap();
        assert_eq!(table.cell(1, 0), "Zoë");
    }

    #[test]
    fn test_blank_rows_survive_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Selection.csv");
        let table = Table::from_rows(vec![
            row(&["Week", "Week 3", ""]),
            row(&[]),
            row(&["Name", "Sat", "Thurs"]),
            row(&["Zoë", "✔", ""]),
        ]);
        export(&table, &path).unwrap();

        let back = import(&path).unwrap();
        assert_eq!(back.rows.len(), 4);
        assert_eq!(back.cell(0, 1), "Week 3");
        assert_eq!(back.cell(2, 2), "Thurs");
        assert_eq!(back.cell(3, 0), "Zoë");
        assert_eq!(back.cell(3, 1), "✔");
    }
}
