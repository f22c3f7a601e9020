//! `squadsheet-dashboard` — filter and render layer for the club stats site.
//!
//! The site ships eight pre-computed Vega-Lite specs. This crate holds the
//! UI state (tab, chart sub-type, filter selections), turns it into a filter
//! expression, and injects that into a copy of the active spec.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod panel;
pub mod tabs;

pub use catalog::{ChartCatalog, ChartKind};
pub use dashboard::{Dashboard, RenderedChart, ScreenSize, Sizing};
pub use error::DashboardError;
pub use filters::{apply_filters, filter_conditions, Facets, FilterState, EXTERNAL_FILTER};
pub use panel::PanelState;
pub use tabs::{apply_tab_rules, PlayerStatsKind, SetPieceKind, Tab, TabControls};
