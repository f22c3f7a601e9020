//! Dashboard state: active tab, filters, and the render sequence.

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{ChartCatalog, ChartKind};
use crate::error::DashboardError;
use crate::filters::{apply_filters, apply_to_layers, filter_conditions, FilterState};
use crate::tabs::{apply_tab_rules, PlayerStatsKind, SetPieceKind, Tab, TabControls};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSize {
    Small,
    Mobile,
    Desktop,
}

/// Responsive sizing applied to each spec before it is handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    pub min_width: f64,
    pub mobile_breakpoint: u32,
    pub small_breakpoint: u32,
    pub mobile_scale: f64,
    pub min_mobile_height: f64,
}

impl Default for Sizing {
    fn default() -> Self {
        Self {
            min_width: 600.0,
            mobile_breakpoint: 768,
            small_breakpoint: 480,
            mobile_scale: 0.8,
            min_mobile_height: 400.0,
        }
    }
}

impl Sizing {
    pub fn screen_size(&self, viewport_width: u32) -> ScreenSize {
        if viewport_width <= self.small_breakpoint {
            ScreenSize::Small
        } else if viewport_width <= self.mobile_breakpoint {
            ScreenSize::Mobile
        } else {
            ScreenSize::Desktop
        }
    }

    /// Widen to the minimum; on narrow screens shrink the height, never
    /// below the floor. Specs without a numeric width/height keep theirs.
    pub fn apply(&self, spec: &mut Value, viewport_width: u32) {
        let Some(view) = spec.as_object_mut() else { return };
        if let Some(width) = view.get("width").and_then(Value::as_f64) {
            view.insert("width".into(), Value::from(width.max(self.min_width)));
        }
        if viewport_width <= self.mobile_breakpoint {
            if let Some(height) = view.get("height").and_then(Value::as_f64) {
                let scaled = (height * self.mobile_scale).max(self.min_mobile_height);
                view.insert("height".into(), Value::from(scaled));
            }
        }
    }
}

/// A filtered, sized copy of one chart spec.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedChart {
    pub generation: u64,
    pub chart: ChartKind,
    pub conditions: Vec<String>,
    pub controls: TabControls,
    pub spec: Value,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    catalog: ChartCatalog,
    sizing: Sizing,
    pub tab: Tab,
    /// Sub-types remembered while their tab is not showing.
    pub player_stats: PlayerStatsKind,
    pub set_piece: SetPieceKind,
    pub filters: FilterState,
    generation: u64,
    shown: Option<RenderedChart>,
}

impl Dashboard {
    pub fn new(catalog: ChartCatalog, sizing: Sizing) -> Self {
        Self {
            catalog,
            sizing,
            tab: Tab::default(),
            player_stats: PlayerStatsKind::default(),
            set_piece: SetPieceKind::default(),
            filters: FilterState::default(),
            generation: 0,
            shown: None,
        }
    }

    /// Switch tab. Dropdown tabs also remember the chosen sub-type.
    pub fn select(&mut self, tab: Tab) {
        match tab {
            Tab::PlayerStats(kind) => self.player_stats = kind,
            Tab::SetPiece(kind) => self.set_piece = kind,
            Tab::Results | Tab::TeamSheets => {}
        }
        self.tab = tab;
    }

    /// Reopen a dropdown tab on the sub-type last shown there.
    pub fn select_player_stats(&mut self) {
        self.tab = Tab::PlayerStats(self.player_stats);
    }

    pub fn select_set_piece(&mut self) {
        self.tab = Tab::SetPiece(self.set_piece);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the active tab's rules, then build the chart for it. Each call
    /// starts a new generation.
    pub fn render(&mut self, viewport_width: u32) -> Result<RenderedChart, DashboardError> {
        let controls = apply_tab_rules(self.tab, &mut self.filters);
        let chart = self.tab.chart();
        let conditions = filter_conditions(&self.filters, self.tab.facets());

        let mut spec = self.catalog.get(chart)?.clone();
        apply_filters(&mut spec, &conditions)
            .map_err(|_| DashboardError::NotAnObject(chart.name().to_string()))?;
        if matches!(self.tab, Tab::SetPiece(_)) {
            apply_to_layers(&mut spec, &conditions);
        }
        self.sizing.apply(&mut spec, viewport_width);

        self.generation += 1;
        log::debug!("render #{} {chart}: {} condition(s)", self.generation, conditions.len());
        Ok(RenderedChart {
            generation: self.generation,
            chart,
            conditions,
            controls,
            spec,
        })
    }

    /// Accept a finished render. Anything older than the latest request is
    /// dropped, so the last render always wins.
    pub fn commit(&mut self, rendered: RenderedChart) -> bool {
        if rendered.generation != self.generation {
            log::debug!("render #{} superseded by #{}", rendered.generation, self.generation);
            return false;
        }
        self.shown = Some(rendered);
        true
    }

    pub fn shown(&self) -> Option<&RenderedChart> {
        self.shown.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> ChartCatalog {
        ChartCatalog::from_specs(ChartKind::ALL.into_iter().map(|k| {
            let spec = match k {
                ChartKind::Lineout | ChartKind::Scrum => json!({
                    "hconcat": [{}, {}, { "layer": [{}, {}] }]
                }),
                _ => json!({ "width": 400, "height": 600, "mark": "bar" }),
            };
            (k, spec)
        }))
    }

    #[test]
    fn sizing_rules() {
        let sizing = Sizing::default();
        let mut spec = json!({ "width": 400, "height": 450 });
        sizing.apply(&mut spec, 700);
        assert_eq!(spec["width"], 600.0);
        assert_eq!(spec["height"], 400.0);
        assert_eq!(sizing.screen_size(480), ScreenSize::Small);
        assert_eq!(sizing.screen_size(1024), ScreenSize::Desktop);
    }

    #[test]
    fn last_render_wins() {
        let mut dash = Dashboard::new(catalog(), Sizing::default());
        let first = dash.render(1200).unwrap();
        dash.filters.squad = Some("2nd".into());
        let second = dash.render(1200).unwrap();
        assert!(!dash.commit(first));
        assert!(dash.commit(second));
        assert_eq!(dash.shown().unwrap().conditions, vec!["datum.squad == '2nd'"]);
    }

    #[test]
    fn set_piece_filters_layers() {
        let mut dash = Dashboard::new(catalog(), Sizing::default());
        dash.filters.game_types = vec!["Cup".into()];
        dash.select(Tab::SetPiece(SetPieceKind::Scrum));
        let rendered = dash.render(1200).unwrap();
        assert_eq!(rendered.chart, ChartKind::Scrum);
        assert_eq!(rendered.spec["hconcat"][2]["layer"][1]["transform"][0]["_externalFilter"], true);

        dash.select(Tab::Results);
        dash.select_set_piece();
        assert_eq!(dash.tab, Tab::SetPiece(SetPieceKind::Scrum));
    }
}
