//! `squadsheet-board` — display projections over the ledger and roster.
//!
//! Every pass is a pure function of its input tables and "now": nothing is
//! carried between runs, so any of them can be re-run at will.

pub mod attendance;
pub mod error;
pub mod form;
pub mod grid;
pub mod positions;
pub mod roster;
pub mod selection;

pub use attendance::{read_marks, training_dates, AttendanceRow, AttendanceSheet};
pub use error::BoardError;
pub use form::{apply_week_labels, form_choices, week_label, week_labels, FormChoices};
pub use grid::AvailabilityGrid;
pub use positions::{PositionColumn, PositionStatus, PositionsBoard, SquadFilter};
pub use roster::{BoardOptions, BoardRow, BoardView, RosterBoard, WeekColumns};
pub use selection::{
    available_by_position, selection_options, week_number, PositionGroup, SelectionOptions,
    SelectionRow, SelectionSheet, TrainingMarker, POSITION_ORDER,
};
