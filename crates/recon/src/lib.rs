//! `squadsheet-recon` — availability ledger reconciliation.
//!
//! Pure engine crate: receives sheet tables, returns write plans and
//! rebuilt tables. No CLI or IO dependencies.

pub mod engine;
pub mod error;
pub mod history;
pub mod index;
pub mod model;
pub mod roster;

pub use engine::{apply_plan, reconcile, sort_ledger};
pub use error::ReconError;
pub use history::{save_attendance, AttendanceMark, SavedAttendance};
pub use index::{AttendanceIndex, ScheduleIndex, SubmissionIndex};
pub use model::{LedgerPlan, ReconInput, ReconSummary, RowUpdate};
pub use roster::{merge_signups, RosterMerge};
