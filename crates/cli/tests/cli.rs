// End-to-end runs of the `squad` binary against a scratch copy of the
// fixture workbook.
//
// With --json, stdout must be exactly one JSON value; logging goes to stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const NOW: &str = "2024-01-03 09:00:00";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// A writable workbook plus a settings file pointing the dashboard at the
/// fixture charts and the panel flag into the scratch dir.
struct Scratch {
    dir: TempDir,
}

impl Scratch {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workbook = dir.path().join("workbook");
        std::fs::create_dir(&workbook).unwrap();
        for entry in std::fs::read_dir(fixtures_dir().join("workbook")).unwrap() {
            let path = entry.unwrap().path();
            std::fs::copy(&path, workbook.join(path.file_name().unwrap())).unwrap();
        }
        let settings = format!(
            "[dashboard]\nsite_dir = {:?}\npanel_state = {:?}\n",
            fixtures_dir().join("site").display().to_string(),
            dir.path().join("panel.json").display().to_string(),
        );
        std::fs::write(dir.path().join("settings.toml"), settings).unwrap();
        Self { dir }
    }

    fn workbook(&self) -> PathBuf {
        self.dir.path().join("workbook")
    }

    fn squad(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_squad"))
            .arg("--workbook")
            .arg(self.workbook())
            .arg("--config")
            .arg(self.dir.path().join("settings.toml"))
            .args(["--now", NOW])
            .args(args)
            .env_remove("SQUAD_WORKBOOK")
            .env("RUST_LOG", "warn")
            .output()
            .expect("run squad")
    }

    fn sheet(&self, name: &str) -> String {
        std::fs::read_to_string(self.workbook().join(format!("{name}.csv"))).unwrap()
    }
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Stdout is a single JSON value and nothing else.
fn single_json(output: &Output) -> serde_json::Value {
    assert_ok(output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    assert!(!trimmed.is_empty(), "stdout should not be empty");
    serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("stdout must be valid JSON.\nParse error: {e}\nstdout:\n{trimmed}"))
}

fn exists(dir: &Path, sheet: &str) -> bool {
    dir.join(format!("{sheet}.csv")).exists()
}

// ===========================================================================
// squad reconcile / submit
// ===========================================================================

#[test]
fn reconcile_json_summary() {
    let scratch = Scratch::new();
    let val = single_json(&scratch.squad(&["--json", "reconcile"]));
    assert_eq!(val["submissions"], 3);
    assert_eq!(val["inserts"], 8);
    assert!(scratch.sheet("AvailabilityLatest").contains("Cara,3,"));

    let again = single_json(&scratch.squad(&["--json", "reconcile"]));
    assert_eq!(again["inserts"], 0);
    assert_eq!(again["updates"], 0);
}

#[test]
fn reconcile_dry_run_writes_nothing() {
    let scratch = Scratch::new();
    let before = scratch.sheet("AvailabilityLatest");
    let val = single_json(&scratch.squad(&["--json", "reconcile", "--dry-run"]));
    assert_eq!(val["inserts"], 8);
    assert_eq!(scratch.sheet("AvailabilityLatest"), before);
}

#[test]
fn submit_writes_both_boards() {
    let scratch = Scratch::new();
    let val = single_json(&scratch.squad(&["--json", "submit"]));
    assert_eq!(val["board_rows"], 4);
    assert!(val["selection"].is_null());
    assert!(exists(&scratch.workbook(), "Availability"));
    assert!(scratch.sheet("AvailabilityPublic").contains("Cara"));
}

#[test]
fn export_writes_public_board_and_json() {
    let scratch = Scratch::new();
    assert_ok(&scratch.squad(&["reconcile"]));
    let out = scratch.dir.path().join("public.json");
    assert_ok(&scratch.squad(&["export", "--out", out.to_str().unwrap()]));
    assert!(exists(&scratch.workbook(), "AvailabilityPublic"));
    let exported: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
    assert!(exported.is_object() || exported.is_array());
}

// ===========================================================================
// squad edit
// ===========================================================================

#[test]
fn edit_positions_filter() {
    let scratch = Scratch::new();
    let val = single_json(&scratch.squad(&[
        "--json", "edit", "--sheet", "Positions", "--cell", "B1", "--value", "1st XV",
    ]));
    assert_eq!(val["intent"], "positions");
    assert_eq!(val["board"]["filter"], "FirstXv");
    assert!(scratch.sheet("Positions").starts_with(",1st XV"));
}

#[test]
fn edit_unwatched_cell_does_nothing() {
    let scratch = Scratch::new();
    let output = scratch.squad(&["--json", "edit", "--sheet", "Players", "--cell", "Z99"]);
    assert_ok(&output);
    assert!(output.stdout.is_empty());
}

#[test]
fn edit_rejects_bad_cell() {
    let scratch = Scratch::new();
    let output = scratch.squad(&["edit", "--sheet", "Positions", "--cell", "1B", "--value", "x"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

    let overlong = "Z".repeat(40) + "1";
    let output = scratch.squad(&["edit", "--sheet", "Positions", "--cell", &overlong, "--value", "x"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn attendance_save_via_edits() {
    let scratch = Scratch::new();
    assert_ok(&scratch.squad(&["reconcile"]));

    let loaded = single_json(&scratch.squad(&[
        "--json", "edit", "--sheet", "Attendance", "--cell", "B1", "--value", "2024-01-02",
    ]));
    assert_eq!(loaded["intent"], "attendance_loaded");
    assert_eq!(loaded["register"]["rows"][0]["name"], "Alice");

    assert_ok(&scratch.squad(&["edit", "--sheet", "Attendance", "--cell", "C4", "--value", "TRUE"]));
    let saved = single_json(&scratch.squad(&[
        "--json", "edit", "--sheet", "Attendance", "--cell", "E1", "--value", "TRUE",
    ]));
    assert_eq!(saved["intent"], "attendance_saved");
    assert_eq!(saved["report"]["saved"]["recorded"], 1);
    assert!(scratch.sheet("AttendanceHistory").contains("Alice"));
}

// ===========================================================================
// Schema errors and --strict
// ===========================================================================

#[test]
fn missing_sheet_is_skipped_without_strict() {
    let scratch = Scratch::new();
    std::fs::remove_file(scratch.workbook().join("Schedule.csv")).unwrap();

    let lenient = scratch.squad(&["board"]);
    assert_ok(&lenient);

    let strict = scratch.squad(&["--strict", "board"]);
    assert_eq!(strict.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("hint:"), "stderr: {stderr}");
    assert!(stderr.contains("Schedule.csv"));
}

#[test]
fn attendance_rejects_match_day() {
    let scratch = Scratch::new();
    let output = scratch.squad(&["attendance", "load", "--date", "2024-01-06"]);
    assert_eq!(output.status.code(), Some(6));
}

// ===========================================================================
// squad selection / form / signup
// ===========================================================================

#[test]
fn selection_picks_first_week() {
    let scratch = Scratch::new();
    assert_ok(&scratch.squad(&["reconcile"]));
    let val = single_json(&scratch.squad(&["--json", "selection"]));
    assert_eq!(val["week"], 1);
    let names: Vec<_> = val["rows"].as_array().unwrap().iter().map(|r| r["name"].clone()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[test]
fn signup_then_form() {
    let scratch = Scratch::new();
    let val = single_json(&scratch.squad(&["--json", "signup"]));
    assert_eq!(val["added"], serde_json::json!(["Fay Green"]));
    assert!(val["form"]["names"].as_array().unwrap().contains(&serde_json::json!("Fay Green")));

    let again = single_json(&scratch.squad(&["--json", "signup"]));
    assert_eq!(again["added"], serde_json::json!([]));
    assert!(again["form"].is_null());

    let out = scratch.dir.path().join("form.json");
    let form = single_json(&scratch.squad(&["--json", "form", "--out", out.to_str().unwrap()]));
    assert_eq!(form["weeks"].as_array().unwrap().len(), 3);
    assert!(form["names"].as_array().unwrap().contains(&serde_json::json!("Fay Green")));
    assert!(out.exists());
}

// ===========================================================================
// squad dashboard
// ===========================================================================

#[test]
fn dashboard_render_injects_filter() {
    let scratch = Scratch::new();
    let output = scratch.squad(&[
        "dashboard", "render", "--chart", "appearances", "--squad", "1st", "--season", "2023/24",
    ]);
    let spec = single_json(&output);
    let transforms = spec["transform"].as_array().unwrap();
    let injected = transforms.last().unwrap();
    assert_eq!(injected["_externalFilter"], true);
    let filter = injected["filter"].as_str().unwrap();
    assert!(filter.contains("datum.squad == '1st'"));
    assert!(filter.contains("2023/24"));
}

#[test]
fn dashboard_unknown_chart() {
    let scratch = Scratch::new();
    let output = scratch.squad(&["dashboard", "render", "--chart", "league-table"]);
    assert_eq!(output.status.code(), Some(11));
}

#[test]
fn dashboard_panel_toggle_persists() {
    let scratch = Scratch::new();
    let first = single_json(&scratch.squad(&["--json", "dashboard", "panel"]));
    let expanded = first["filterPanelExpanded"].as_bool().unwrap();

    let toggled = single_json(&scratch.squad(&["--json", "dashboard", "panel", "--toggle"]));
    assert_eq!(toggled["filterPanelExpanded"], !expanded);
    assert!(scratch.dir.path().join("panel.json").exists());
}
