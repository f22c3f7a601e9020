//! The filter panel's persisted open/closed flag.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelState {
    #[serde(rename = "filterPanelExpanded")]
    pub expanded: bool,
}

impl PanelState {
    /// A missing or unreadable file means collapsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        squadsheet_io::json::read(path).unwrap_or_else(|e| {
            log::warn!("ignoring panel state: {e}");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), DashboardError> {
        squadsheet_io::json::write_pretty(self, path)?;
        Ok(())
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// The backdrop only covers the page on narrow screens.
    pub fn backdrop_visible(&self, viewport_width: u32, mobile_breakpoint: u32) -> bool {
        self.expanded && viewport_width <= mobile_breakpoint
    }
}
