//! The eight chart specs the site loads at start-up.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Appearances,
    Captains,
    PointScorers,
    Cards,
    TeamSheets,
    Results,
    Lineout,
    Scrum,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Appearances,
        ChartKind::Captains,
        ChartKind::PointScorers,
        ChartKind::Cards,
        ChartKind::TeamSheets,
        ChartKind::Results,
        ChartKind::Lineout,
        ChartKind::Scrum,
    ];

    /// Spec location relative to the site root.
    pub fn path(&self) -> &'static str {
        match self {
            ChartKind::Appearances => "data/charts/player_appearances.json",
            ChartKind::Captains => "data/charts/captains.json",
            ChartKind::PointScorers => "data/charts/point_scorers.json",
            ChartKind::Cards => "data/charts/cards.json",
            ChartKind::TeamSheets => "data/charts/team_sheets.json",
            ChartKind::Results => "data/charts/results.json",
            ChartKind::Lineout => "data/charts/lineout_success.json",
            ChartKind::Scrum => "data/charts/scrum_success.json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Appearances => "appearances",
            ChartKind::Captains => "captains",
            ChartKind::PointScorers => "point-scorers",
            ChartKind::Cards => "cards",
            ChartKind::TeamSheets => "team-sheets",
            ChartKind::Results => "results",
            ChartKind::Lineout => "lineout",
            ChartKind::Scrum => "scrum",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| DashboardError::UnknownChart(s.to_string()))
    }
}

/// Loaded specs, keyed by chart.
#[derive(Debug, Clone, Default)]
pub struct ChartCatalog {
    specs: BTreeMap<ChartKind, Value>,
}

impl ChartCatalog {
    /// Load all eight specs. Any one failing to load fails the whole catalog.
    pub fn load(site_dir: &Path) -> Result<Self, DashboardError> {
        let mut specs = BTreeMap::new();
        for kind in ChartKind::ALL {
            let spec: Value = squadsheet_io::json::read(&site_dir.join(kind.path()))?;
            specs.insert(kind, spec);
        }
        log::info!("loaded {} chart specs from {}", specs.len(), site_dir.display());
        Ok(Self { specs })
    }

    pub fn from_specs(specs: impl IntoIterator<Item = (ChartKind, Value)>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
        }
    }

    pub fn get(&self, kind: ChartKind) -> Result<&Value, DashboardError> {
        self.specs.get(&kind).ok_or(DashboardError::MissingSpec(kind))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.name().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("league".parse::<ChartKind>().is_err());
    }

    #[test]
    fn missing_spec() {
        let catalog = ChartCatalog::from_specs([(ChartKind::Cards, serde_json::json!({}))]);
        assert!(catalog.get(ChartKind::Cards).is_ok());
        assert!(matches!(catalog.get(ChartKind::Scrum), Err(DashboardError::MissingSpec(ChartKind::Scrum))));
    }
}
