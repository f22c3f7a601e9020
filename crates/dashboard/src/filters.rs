//! Filter state and the Vega expression built from it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::DashboardError;

/// Marker key on transforms this layer owns. Anything else in a spec's
/// transform list is left alone.
pub const EXTERNAL_FILTER: &str = "_externalFilter";

/// Current selections in the filter panel. Empty lists mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// `None` is the "All" radio.
    pub squad: Option<String>,
    pub seasons: Vec<String>,
    pub positions: Vec<String>,
    pub game_types: Vec<String>,
    pub include_bench: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            squad: None,
            seasons: Vec::new(),
            positions: Vec::new(),
            game_types: Vec::new(),
            include_bench: true,
        }
    }
}

/// Which optional facets a chart responds to. Squad and season always apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facets {
    pub bench: bool,
    pub position: bool,
    pub competition: bool,
}

impl Facets {
    pub const ALL: Facets = Facets {
        bench: true,
        position: true,
        competition: true,
    };
    pub const COMPETITION: Facets = Facets {
        bench: false,
        position: false,
        competition: true,
    };
    pub const NONE: Facets = Facets {
        bench: false,
        position: false,
        competition: false,
    };
}

fn quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn list(values: &[String]) -> String {
    Value::from(values.to_vec()).to_string()
}

/// One condition per active facet, in panel order.
pub fn filter_conditions(state: &FilterState, facets: Facets) -> Vec<String> {
    let mut conditions = Vec::new();

    if let Some(squad) = state.squad.as_deref().filter(|s| !s.is_empty()) {
        conditions.push(format!("datum.squad == '{}'", quoted(squad)));
    }
    if !state.seasons.is_empty() {
        conditions.push(format!("indexof({}, datum.season) >= 0", list(&state.seasons)));
    }
    if facets.position && !state.positions.is_empty() {
        conditions.push(format!("indexof({}, datum.position) >= 0", list(&state.positions)));
    }
    if facets.competition && !state.game_types.is_empty() {
        conditions.push(format!(
            "(indexof({}, datum.game_type) >= 0 || datum.game_type == null || datum.game_type == '')",
            list(&state.game_types)
        ));
    }
    if facets.bench && !state.include_bench {
        conditions.push("datum.is_starter == true".to_string());
    }
    conditions
}

/// Replace this layer's filter transform on one view.
fn inject(view: &mut Map<String, Value>, expr: Option<&str>) {
    let transform = view
        .entry("transform")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !transform.is_array() {
        *transform = Value::Array(Vec::new());
    }
    if let Value::Array(items) = transform {
        items.retain(|t| t.get(EXTERNAL_FILTER).and_then(Value::as_bool) != Some(true));
        if let Some(expr) = expr {
            items.push(json!({ "filter": expr, EXTERNAL_FILTER: true }));
        }
    }
}

/// AND the conditions together and attach them to `spec`. Earlier injected
/// filters are removed first, so re-applying never stacks.
pub fn apply_filters(spec: &mut Value, conditions: &[String]) -> Result<(), DashboardError> {
    let expr = (!conditions.is_empty()).then(|| conditions.join(" && "));
    let view = spec
        .as_object_mut()
        .ok_or_else(|| DashboardError::NotAnObject("chart".into()))?;
    inject(view, expr.as_deref());
    Ok(())
}

/// Set-piece specs draw their success-rate panel from layers inside
/// `hconcat[2]`; each layer gets the same filter. Missing panels are skipped.
pub fn apply_to_layers(spec: &mut Value, conditions: &[String]) {
    let expr = (!conditions.is_empty()).then(|| conditions.join(" && "));
    let Some(layers) = spec
        .get_mut("hconcat")
        .and_then(|h| h.get_mut(2))
        .and_then(|panel| panel.get_mut("layer"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    for layer in layers.iter_mut().filter_map(Value::as_object_mut) {
        inject(layer, expr.as_deref());
    }
}
