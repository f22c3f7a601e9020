// squad - availability, selection and attendance for the squad workbook

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;

use squadsheet_board::BoardView;
use squadsheet_cli::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use squadsheet_cli::pipelines;
use squadsheet_cli::{dispatch, CliError, EditIntent};
use squadsheet_config::Settings;
use squadsheet_core::dates::{format_week, parse_date, parse_timestamp};
use squadsheet_core::{CellRef, Workbook};
use squadsheet_dashboard::{ChartCatalog, Dashboard, FilterState, PanelState, Sizing, Tab};
use squadsheet_io::CsvWorkbook;

#[derive(Parser)]
#[command(name = "squad")]
#[command(about = "Keep the squad availability workbook up to date")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Workbook directory (one CSV file per sheet)
    #[arg(long, short = 'w', global = true, env = "SQUAD_WORKBOOK", default_value = ".")]
    workbook: PathBuf,

    /// Settings file (default: the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run as if it were this time ('2024-01-03 09:00:00' or a date)
    #[arg(long, global = true, value_name = "TIMESTAMP")]
    now: Option<String>,

    /// Print the result as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Fail (exit 4) on missing sheets or headers instead of skipping
    #[arg(long, global = true)]
    strict: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge form responses and attendance into the ledger
    Reconcile {
        /// Work out the changes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Everything a new availability response triggers: ledger, board, selection
    Submit,

    /// Record a cell edit and run whatever it triggers
    #[command(after_help = "\
Examples:
  squad edit --sheet Positions --cell B1 --value '1st XV'
  squad edit --sheet Selection --cell A2 --value 'Week 3: 1s v Hitchin'
  squad edit --sheet Attendance --cell E1 --value TRUE")]
    Edit {
        #[arg(long)]
        sheet: String,

        /// A1 reference
        #[arg(long)]
        cell: String,

        /// New value. Omit if the file was already edited by hand.
        #[arg(long)]
        value: Option<String>,
    },

    /// Rebuild the roster board
    Board {
        /// Build the public export instead of the coaches' board
        #[arg(long)]
        public: bool,
    },

    /// Write the public export, optionally also as JSON
    Export {
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Refresh the week dropdown and rebuild the selection sheet
    Selection {
        /// Select this week first
        #[arg(long)]
        week: Option<String>,
    },

    /// Rebuild the positions board
    Positions {
        /// Squad, '1st XV', '2nd XV' or Colts
        #[arg(long)]
        filter: Option<String>,
    },

    /// Refresh week labels and print the availability form's choices
    Form {
        /// Also write the choices as JSON
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Add new sign-ups to the roster
    Signup,

    /// Training attendance register
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },

    /// Stats dashboard charts
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },
}

#[derive(Subcommand)]
enum AttendanceCommands {
    /// Fill the register for a training date
    Load {
        /// Defaults to the date already on the sheet
        #[arg(long)]
        date: Option<String>,
    },
    /// Save the register into the attendance history
    Save,
    /// List Tuesday and Thursday training dates
    Dates,
}

#[derive(Subcommand)]
enum DashboardCommands {
    /// Print a chart spec with the filters applied
    #[command(after_help = "\
Examples:
  squad dashboard render --chart appearances --squad 1st --season 2023/24
  squad dashboard render --chart lineout --game-type League --width 700")]
    Render {
        /// appearances, captains, point-scorers, cards, results, team-sheets, lineout, scrum
        #[arg(long, default_value = "appearances")]
        chart: String,

        #[arg(long)]
        squad: Option<String>,

        /// Repeatable
        #[arg(long)]
        season: Vec<String>,

        /// Repeatable
        #[arg(long)]
        position: Vec<String>,

        /// Repeatable
        #[arg(long)]
        game_type: Vec<String>,

        /// Starters only
        #[arg(long)]
        exclude_bench: bool,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,

        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
    /// Show or toggle the filter panel flag
    Panel {
        #[arg(long)]
        toggle: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) if err.is_schema() && !cli.strict => {
            log::warn!("{}; nothing done", err.message);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let now = resolve_now(cli.now.as_deref())?;
    let mut wb = CsvWorkbook::open(&cli.workbook);

    match &cli.command {
        Commands::Reconcile { dry_run } => {
            let plan = pipelines::reconcile_ledger(&mut wb, &settings, now, !dry_run)?;
            emit(cli.json, &plan.summary, || {
                let s = &plan.summary;
                eprintln!(
                    "{}: {} updated, {} inserted, {} removed{}",
                    settings.sheets.availability_latest,
                    s.updates,
                    s.inserts,
                    s.removals,
                    if *dry_run { " (dry run)" } else { "" }
                );
            })
        }
        Commands::Submit => {
            let report = pipelines::form_submit(&mut wb, &settings, now)?;
            emit(cli.json, &report, || {
                eprintln!(
                    "ledger: {} updated, {} inserted; board: {} players",
                    report.ledger.updates, report.ledger.inserts, report.board_rows
                );
            })
        }
        Commands::Edit { sheet, cell, value } => {
            let cell_ref = CellRef::parse(cell).map_err(|e| CliError::args(e.to_string()))?;
            if let Some(value) = value {
                pipelines::write_cell(&mut wb, sheet, cell_ref, value)?;
            }
            let current = match value {
                Some(v) => v.clone(),
                None => wb.table_or_empty(sheet)?.get_a1(cell_ref).to_string(),
            };
            let Some(intent) = EditIntent::classify(&settings.sheets, sheet, cell_ref, &current) else {
                log::info!("{sheet}!{cell_ref}: nothing to do");
                return Ok(());
            };
            let outcome = dispatch(intent, &mut wb, &settings, now)?;
            emit(cli.json, &outcome, || eprintln!("{sheet}!{cell_ref}: {intent:?} done"))
        }
        Commands::Board { public } => {
            let view = if *public { BoardView::Public } else { BoardView::Private };
            let board = pipelines::refresh_board(&mut wb, &settings, now.date(), view)?;
            emit(cli.json, &board, || {
                eprintln!("{:?} board: {} players, {} weeks", view, board.rows.len(), board.weeks.len());
            })
        }
        Commands::Export { out } => {
            let board = pipelines::refresh_board(&mut wb, &settings, now.date(), BoardView::Public)?;
            if let Some(path) = out {
                squadsheet_io::json::export(&board.to_table(), path)?;
            }
            emit(cli.json, &board, || eprintln!("public export: {} players", board.rows.len()))
        }
        Commands::Selection { week } => {
            if let Some(week) = week {
                pipelines::write_cell(&mut wb, &settings.sheets.selection, CellRef::new(1, 0), week)?;
            }
            let options = pipelines::refresh_selection_options(&mut wb, &settings, now.date())?;
            let sheet = pipelines::refresh_selection(&mut wb, &settings)?;
            emit(cli.json, &sheet, || {
                for option in &options.options {
                    let marker = if *option == options.selected { "*" } else { " " };
                    println!("{marker} {option}");
                }
                if let Some(sheet) = &sheet {
                    eprintln!("{}: {} players", sheet.label, sheet.rows.len());
                }
            })
        }
        Commands::Positions { filter } => {
            if let Some(filter) = filter {
                pipelines::write_cell(&mut wb, &settings.sheets.positions, CellRef::new(0, 1), filter)?;
            }
            let board = pipelines::refresh_positions(&mut wb, &settings)?;
            emit(cli.json, &board, || {
                for column in &board.columns {
                    println!("{:<12} {}", column.position, column.players.len());
                }
            })
        }
        Commands::Form { out } => {
            let choices = pipelines::update_form(&mut wb, &settings, now)?;
            if let Some(path) = out {
                squadsheet_io::json::write_pretty(&choices, path)?;
            }
            emit(cli.json, &choices, || {
                println!("{}:", settings.questions.week);
                for label in &choices.weeks {
                    println!("  {label}");
                }
                println!("{}: {} players", settings.questions.name, choices.names.len());
            })
        }
        Commands::Signup => {
            let report = pipelines::signup(&mut wb, &settings, now)?;
            emit(cli.json, &report, || {
                for name in &report.added {
                    println!("added {name}");
                }
                eprintln!("{} new player(s)", report.added.len());
            })
        }
        Commands::Attendance { command } => match command {
            AttendanceCommands::Load { date } => {
                let date = date.as_deref().map(parse_cli_date).transpose()?;
                let register = pipelines::load_attendance(&mut wb, &settings, date)?;
                emit(cli.json, &register, || {
                    for (i, row) in register.rows.iter().enumerate() {
                        println!("{:>2}  {:<24} {}", i + 1, row.name, if row.attended { "✔" } else { "" });
                    }
                    if register.previously_saved {
                        eprintln!("attendance for {} was already saved", format_week(register.date));
                    }
                })
            }
            AttendanceCommands::Save => {
                let report = pipelines::save_register(&mut wb, &settings, now)?;
                emit(cli.json, &report, || {
                    eprintln!(
                        "{} {}: {} recorded, {} replaced",
                        format_week(report.saved.date),
                        report.saved.session,
                        report.saved.recorded,
                        report.saved.replaced
                    );
                })
            }
            AttendanceCommands::Dates => {
                let dates = pipelines::attendance_dates(&wb, &settings)?;
                emit(cli.json, &dates, || {
                    for date in &dates {
                        println!("{}", format_week(*date));
                    }
                })
            }
        },
        Commands::Dashboard { command } => run_dashboard(cli, &settings, command),
    }
}

fn run_dashboard(cli: &Cli, settings: &Settings, command: &DashboardCommands) -> Result<(), CliError> {
    let dash_settings = &settings.dashboard;
    match command {
        DashboardCommands::Render {
            chart,
            squad,
            season,
            position,
            game_type,
            exclude_bench,
            width,
            out,
        } => {
            let tab: Tab = chart.parse()?;
            let catalog = ChartCatalog::load(&dash_settings.site_dir)?;
            let sizing = Sizing {
                min_width: f64::from(dash_settings.min_width),
                mobile_breakpoint: dash_settings.mobile_breakpoint,
                small_breakpoint: dash_settings.small_breakpoint,
                mobile_scale: dash_settings.mobile_scale,
                ..Sizing::default()
            };
            let mut dashboard = Dashboard::new(catalog, sizing);
            dashboard.select(tab);
            dashboard.filters = FilterState {
                squad: squad.clone(),
                seasons: season.clone(),
                positions: position.clone(),
                game_types: game_type.clone(),
                include_bench: !exclude_bench,
            };
            let rendered = dashboard.render(*width)?;
            match out {
                Some(path) => squadsheet_io::json::write_pretty(&rendered.spec, path)?,
                None => print_json(&rendered.spec)?,
            }
            for condition in &rendered.conditions {
                log::debug!("filter: {condition}");
            }
            Ok(())
        }
        DashboardCommands::Panel { toggle } => {
            let path = dash_settings.effective_panel_state();
            let mut panel = PanelState::load(&path);
            if *toggle {
                panel.toggle();
                panel.save(&path)?;
            }
            emit(cli.json, &panel, || {
                println!("filter panel {}", if panel.expanded { "expanded" } else { "collapsed" });
            })
        }
    }
}

fn resolve_now(arg: Option<&str>) -> Result<NaiveDateTime, CliError> {
    match arg {
        Some(s) => parse_timestamp(s).ok_or_else(|| {
            CliError::new(EXIT_USAGE, format!("--now: cannot parse '{s}'"))
                .with_hint("use 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'")
        }),
        None => Ok(Local::now().naive_local()),
    }
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, CliError> {
    parse_date(s).ok_or_else(|| CliError::args(format!("cannot parse date '{s}'")))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    println!("{}", out);
    Ok(())
}

/// JSON on stdout when asked, otherwise the human summary.
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<(), CliError> {
    if json {
        print_json(value)
    } else {
        human();
        Ok(())
    }
}
