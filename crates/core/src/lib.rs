//! `squadsheet-core` — shared types for the squad workbook.
//!
//! Every sheet is a header-keyed [`Table`] of strings. Typed views
//! ([`ScheduleWeek`], [`Player`], [`LedgerRow`], ...) are parsed out of
//! those tables on demand and rendered back when written.

pub mod availability;
pub mod dates;
pub mod error;
pub mod model;
pub mod table;
pub mod workbook;

pub use availability::{effective_availability, Mark};
pub use error::{CoreError, WorkbookError};
pub use model::{
    AttendanceEntry, AttendanceKey, FormSubmission, LedgerKey, LedgerRow, Player, ScheduleWeek,
    Session, SessionSet, SubmissionKey,
};
pub use table::{CellRef, HeaderIndex, Table};
pub use workbook::{MemoryWorkbook, Workbook};
