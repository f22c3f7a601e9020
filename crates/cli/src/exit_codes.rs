//! CLI Exit Code Registry
//!
//! The single source of truth for `squad` exit codes. Scripts and cron jobs
//! rely on them, so codes are never reused.
//!
//! | Range   | Domain     | Description                                   |
//! |---------|------------|-----------------------------------------------|
//! | 0       | Universal  | Success                                       |
//! | 1       | Universal  | General error (unspecified)                   |
//! | 2       | Universal  | Usage error (bad args, bad settings file)     |
//! | 3       | Workbook   | Sheet file could not be read or written       |
//! | 4       | Workbook   | Missing sheet or header (only with --strict)  |
//! | 5       | Workbook   | Malformed cell, CSV or JSON                   |
//! | 6       | Workbook   | Input the sheets can't act on (date, week)    |
//! | 10-19   | dashboard  | Chart spec loading and lookup                 |

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// General error. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments or an invalid settings file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Workbook (3-9)
// =============================================================================

/// A sheet file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// A sheet or header the command needs is missing. Without `--strict`
/// this is logged and the command exits 0 having done nothing.
pub const EXIT_SCHEMA: u8 = 4;

/// A cell reference, CSV file or JSON file could not be parsed.
pub const EXIT_PARSE: u8 = 5;

/// The sheets hold a value the command can't act on: a non-training date
/// on the attendance sheet, a selection label without a week number, an
/// unknown squad filter.
pub const EXIT_INPUT: u8 = 6;

// =============================================================================
// Dashboard (10-19)
// =============================================================================

/// A chart spec is missing or is not valid JSON.
pub const EXIT_DASHBOARD_SPEC: u8 = 10;

/// Unknown chart or tab name.
pub const EXIT_DASHBOARD_CHART: u8 = 11;

/// A spec is not a JSON object and cannot take a filter.
pub const EXIT_DASHBOARD_SHAPE: u8 = 12;
