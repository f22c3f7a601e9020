// File I/O operations

pub mod csv;
pub mod error;
pub mod json;
pub mod workbook;

pub use error::IoError;
pub use workbook::CsvWorkbook;
