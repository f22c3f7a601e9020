//! Tabs, chart sub-types, and the control rules each tab imposes.

use std::str::FromStr;

use serde::Serialize;

use crate::catalog::ChartKind;
use crate::error::DashboardError;
use crate::filters::{Facets, FilterState};

/// First season with team-sheet level data.
pub const FIRST_DETAILED_SEASON: &str = "2021/22";
/// No rugby was played this season; the option stays disabled.
pub const VOID_SEASON: &str = "2020/21";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatsKind {
    #[default]
    Appearances,
    Captains,
    PointScorers,
    Cards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetPieceKind {
    #[default]
    Lineout,
    Scrum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    PlayerStats(PlayerStatsKind),
    Results,
    TeamSheets,
    SetPiece(SetPieceKind),
}

impl Default for Tab {
    fn default() -> Self {
        Tab::PlayerStats(PlayerStatsKind::Appearances)
    }
}

impl Tab {
    pub fn chart(&self) -> ChartKind {
        match self {
            Tab::PlayerStats(PlayerStatsKind::Appearances) => ChartKind::Appearances,
            Tab::PlayerStats(PlayerStatsKind::Captains) => ChartKind::Captains,
            Tab::PlayerStats(PlayerStatsKind::PointScorers) => ChartKind::PointScorers,
            Tab::PlayerStats(PlayerStatsKind::Cards) => ChartKind::Cards,
            Tab::Results => ChartKind::Results,
            Tab::TeamSheets => ChartKind::TeamSheets,
            Tab::SetPiece(SetPieceKind::Lineout) => ChartKind::Lineout,
            Tab::SetPiece(SetPieceKind::Scrum) => ChartKind::Scrum,
        }
    }

    pub fn facets(&self) -> Facets {
        match self {
            Tab::PlayerStats(PlayerStatsKind::Appearances) | Tab::TeamSheets => Facets::ALL,
            Tab::PlayerStats(PlayerStatsKind::Captains) | Tab::Results | Tab::SetPiece(_) => Facets::COMPETITION,
            Tab::PlayerStats(PlayerStatsKind::PointScorers | PlayerStatsKind::Cards) => Facets::NONE,
        }
    }
}

impl From<ChartKind> for Tab {
    fn from(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Appearances => Tab::PlayerStats(PlayerStatsKind::Appearances),
            ChartKind::Captains => Tab::PlayerStats(PlayerStatsKind::Captains),
            ChartKind::PointScorers => Tab::PlayerStats(PlayerStatsKind::PointScorers),
            ChartKind::Cards => Tab::PlayerStats(PlayerStatsKind::Cards),
            ChartKind::Results => Tab::Results,
            ChartKind::TeamSheets => Tab::TeamSheets,
            ChartKind::Lineout => Tab::SetPiece(SetPieceKind::Lineout),
            ChartKind::Scrum => Tab::SetPiece(SetPieceKind::Scrum),
        }
    }
}

/// Tabs are named by the chart they show.
impl FromStr for Tab {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ChartKind>().map(Tab::from)
    }
}

/// Control enablement after a tab's rules have run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabControls {
    pub positions_enabled: bool,
    pub bench_enabled: bool,
    /// Seasons before this one are disabled.
    pub min_season: Option<&'static str>,
    /// A selection was pruned, so the chart must be drawn again.
    pub needs_rerender: bool,
}

impl TabControls {
    pub fn season_enabled(&self, season: &str) -> bool {
        season != VOID_SEASON && self.min_season.map_or(true, |min| season >= min)
    }
}

fn is_old(season: &str) -> bool {
    season < FIRST_DETAILED_SEASON
}

/// Clear and lock the position picker. True when a selection was dropped.
fn lock_positions(state: &mut FilterState) -> bool {
    let changed = !state.positions.is_empty();
    state.positions.clear();
    changed
}

fn prune_old_seasons(state: &mut FilterState) -> bool {
    let before = state.seasons.len();
    state.seasons.retain(|s| !is_old(s));
    state.seasons.len() != before
}

/// Adjust `state` to what the tab allows and report which controls are live.
/// Seasons are compared as `YYYY/YY` strings.
pub fn apply_tab_rules(tab: Tab, state: &mut FilterState) -> TabControls {
    let locked = |state: &mut FilterState, min_season| {
        let needs_rerender = lock_positions(state);
        state.include_bench = true;
        TabControls {
            positions_enabled: false,
            bench_enabled: false,
            min_season,
            needs_rerender,
        }
    };

    let controls = match tab {
        Tab::TeamSheets => TabControls {
            positions_enabled: true,
            bench_enabled: true,
            min_season: Some(FIRST_DETAILED_SEASON),
            needs_rerender: prune_old_seasons(state),
        },
        Tab::PlayerStats(PlayerStatsKind::Appearances) => {
            if state.seasons.iter().any(|s| is_old(s)) {
                locked(state, None)
            } else {
                TabControls {
                    positions_enabled: true,
                    bench_enabled: true,
                    min_season: None,
                    needs_rerender: false,
                }
            }
        }
        Tab::PlayerStats(PlayerStatsKind::Captains) => {
            let pruned = prune_old_seasons(state);
            let mut controls = locked(state, Some(FIRST_DETAILED_SEASON));
            controls.needs_rerender |= pruned;
            controls
        }
        Tab::PlayerStats(PlayerStatsKind::PointScorers | PlayerStatsKind::Cards)
        | Tab::Results
        | Tab::SetPiece(_) => locked(state, None),
    };
    log::debug!("{tab:?}: {controls:?}");
    controls
}
