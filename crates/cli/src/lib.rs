//! `squadsheet-cli` — pipelines and edit dispatch behind the `squad` binary.

pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod pipelines;

pub use dispatch::{dispatch, Dispatched, EditIntent};
pub use error::CliError;
