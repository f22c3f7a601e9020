use std::collections::HashMap;
use std::fmt;

use crate::error::CoreError;

/// A sheet as a grid of strings.
///
/// Data sheets keep their header row at index 0; layout sheets (Positions,
/// Selection, Attendance) are addressed by [`CellRef`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// A table holding only a header row.
    pub fn with_headers(headers: &[&str]) -> Self {
        Self {
            rows: vec![headers.iter().map(|h| h.to_string()).collect()],
        }
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// True when the sheet has no rows at all (not even headers).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rows below the header row.
    pub fn data_rows(&self) -> &[Vec<String>] {
        if self.rows.len() > 1 {
            &self.rows[1..]
        } else {
            &[]
        }
    }

    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers().iter().position(|h| h.trim() == name)
    }

    /// Resolve the named columns once. Fails on the first missing header.
    pub fn index(&self, sheet: &str, required: &[&str]) -> Result<HeaderIndex, CoreError> {
        let mut columns = HashMap::new();
        for (i, h) in self.headers().iter().enumerate() {
            columns.entry(h.trim().to_string()).or_insert(i);
        }
        for name in required {
            if !columns.contains_key(*name) {
                return Err(CoreError::MissingColumn {
                    sheet: sheet.into(),
                    column: (*name).into(),
                });
            }
        }
        Ok(HeaderIndex { columns })
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Write a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize(col + 1, String::new());
        }
        r[col] = value.into();
    }

    pub fn get_a1(&self, cell: CellRef) -> &str {
        self.cell(cell.row, cell.col)
    }

    pub fn set_a1(&mut self, cell: CellRef, value: impl Into<String>) {
        self.set(cell.row, cell.col, value);
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Blank every cell in rows `from..to` without removing them.
    pub fn clear_rows(&mut self, from: usize, to: usize) {
        let end = to.min(self.rows.len());
        for row in self.rows.iter_mut().take(end).skip(from) {
            for cell in row.iter_mut() {
                cell.clear();
            }
        }
    }
}

/// Header name → column position, resolved once per sheet read.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Trimmed value of `name` in `row`; empty for missing columns or short rows.
    pub fn value<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.get(name)
            .and_then(|i| row.get(i))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Largest sheet a reference may address (XFD1048576).
const MAX_COLS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

/// Zero-based cell position parsed from A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn parse(a1: &str) -> Result<Self, CoreError> {
        let s = a1.trim().to_ascii_uppercase();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| CoreError::CellRef(a1.into()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::CellRef(a1.into()));
        }
        let row: usize = digits.parse().map_err(|_| CoreError::CellRef(a1.into()))?;
        if row == 0 || row > MAX_ROWS {
            return Err(CoreError::CellRef(a1.into()));
        }
        let col = letters
            .bytes()
            .try_fold(0usize, |acc, b| acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize))
            .filter(|&n| n <= MAX_COLS)
            .ok_or_else(|| CoreError::CellRef(a1.into()))?;
        Ok(Self { row: row - 1, col: col - 1 })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = String::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.insert(0, (b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        write!(f, "{}{}", letters, self.row + 1)
    }
}
