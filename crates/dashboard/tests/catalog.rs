use std::path::PathBuf;

use squadsheet_dashboard::{
    ChartCatalog, ChartKind, Dashboard, PanelState, PlayerStatsKind, SetPieceKind, Sizing, Tab,
    EXTERNAL_FILTER,
};

fn site_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn dashboard() -> Dashboard {
    let catalog = ChartCatalog::load(&site_dir()).unwrap();
    assert_eq!(catalog.len(), ChartKind::ALL.len());
    Dashboard::new(catalog, Sizing::default())
}

#[test]
fn missing_site_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ChartCatalog::load(dir.path()).is_err());
}

#[test]
fn appearances_keep_own_transforms() {
    let mut dash = dashboard();
    dash.filters.squad = Some("1st".into());
    dash.filters.seasons = vec!["2023/24".into()];
    dash.filters.include_bench = false;

    let rendered = dash.render(1280).unwrap();
    let transform = rendered.spec["transform"].as_array().unwrap();
    assert_eq!(transform.len(), 2);
    assert_eq!(transform[0]["filter"], "datum.season >= '2010/11'");
    assert_eq!(
        transform[1]["filter"],
        r#"datum.squad == '1st' && indexof(["2023/24"], datum.season) >= 0 && datum.is_starter == true"#
    );
    assert_eq!(rendered.spec["width"], 600.0);
    assert_eq!(rendered.spec["height"], 700);
}

#[test]
fn switching_to_cards_drops_position_and_bench() {
    let mut dash = dashboard();
    dash.filters.positions = vec!["Prop".into()];
    dash.filters.include_bench = false;
    dash.select(Tab::PlayerStats(PlayerStatsKind::Cards));

    let rendered = dash.render(1280).unwrap();
    assert!(rendered.controls.needs_rerender);
    assert!(dash.filters.positions.is_empty());
    assert!(dash.filters.include_bench);
    assert!(rendered.spec["transform"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t.get(EXTERNAL_FILTER).is_none()));
}

#[test]
fn lineout_layers_and_mobile_height() {
    let mut dash = dashboard();
    dash.filters.game_types = vec!["League".into()];
    dash.select(Tab::SetPiece(SetPieceKind::Lineout));
    let rendered = dash.render(600).unwrap();

    let line = &rendered.spec["hconcat"][2]["layer"][1]["transform"];
    assert_eq!(line.as_array().unwrap().len(), 2);
    assert_eq!(line[1][EXTERNAL_FILTER], true);
    assert!(rendered.spec["hconcat"][0].get("transform").is_none());
    assert!(dash.commit(rendered));
}

#[test]
fn panel_flag_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("squadsheet").join("panel.json");
    let mut panel = PanelState::load(&path);
    panel.toggle();
    panel.save(&path).unwrap();
    assert!(PanelState::load(&path).expanded);
}
