// Squad workbook settings
// Loaded from ~/.config/squadsheet/settings.toml, or a path given on the command line

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Names of the sheets (CSV files) in the workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub players: String,
    pub signup_form: String,
    pub positions: String,
    pub schedule: String,
    pub availability_form: String,
    /// The ledger.
    pub availability_latest: String,
    /// Private roster board.
    pub availability: String,
    /// Public export of the roster board.
    pub availability_public: String,
    pub attendance: String,
    pub attendance_history: String,
    pub selection: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            players: "Players".into(),
            signup_form: "SignUpForm".into(),
            positions: "Positions".into(),
            schedule: "Schedule".into(),
            availability_form: "AvailabilityForm".into(),
            availability_latest: "AvailabilityLatest".into(),
            availability: "Availability".into(),
            availability_public: "AvailabilityPublic".into(),
            attendance: "Attendance".into(),
            attendance_history: "AttendanceHistory".into(),
            selection: "Selection".into(),
        }
    }
}

/// Titles of the availability form's dropdown questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionTitles {
    pub name: String,
    pub week: String,
}

impl Default for QuestionTitles {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            week: "Week commencing".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Week labels offered on the availability form.
    pub form_week_choices: usize,
    /// Rows in the public export, header rows included.
    pub public_max_rows: usize,
    /// Weeks ahead shown on the roster board before columns are hidden.
    pub board_horizon_weeks: u32,
    /// Player rows on the attendance sheet.
    pub attendance_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            form_week_choices: 6,
            public_max_rows: 205,
            board_horizon_weeks: 6,
            attendance_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Site root; chart specs live under `data/charts/` below it.
    pub site_dir: PathBuf,
    /// Where the filter panel flag is kept. Defaults to the user data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_state: Option<PathBuf>,
    pub min_width: u32,
    pub mobile_breakpoint: u32,
    pub small_breakpoint: u32,
    pub mobile_scale: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("."),
            panel_state: None,
            min_width: 600,
            mobile_breakpoint: 768,
            small_breakpoint: 480,
            mobile_scale: 0.8,
        }
    }
}

impl DashboardSettings {
    pub fn effective_panel_state(&self) -> PathBuf {
        self.panel_state.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("squadsheet")
                .join("panel.json")
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sheets: SheetNames,
    pub questions: QuestionTitles,
    pub limits: Limits,
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Default location of the settings file.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("squadsheet");
        config_dir.join("settings.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.form_week_choices == 0 {
            return Err(ConfigError::Invalid("limits.form_week_choices must be at least 1".into()));
        }
        // The four board header rows always fit.
        if limits.public_max_rows <= 4 {
            return Err(ConfigError::Invalid(format!(
                "limits.public_max_rows must exceed the 4 header rows, got {}",
                limits.public_max_rows
            )));
        }
        if limits.attendance_capacity == 0 {
            return Err(ConfigError::Invalid("limits.attendance_capacity must be at least 1".into()));
        }
        if self.dashboard.min_width == 0 {
            return Err(ConfigError::Invalid("dashboard.min_width must be positive".into()));
        }
        Ok(())
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&contents)?;
        log::debug!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
