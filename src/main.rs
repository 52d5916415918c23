// Entry point and high-level CLI flow.
//
// Every subcommand loads both sheets, builds a fresh `Session` and renders
// one view. `interactive` keeps the loaded tables and the session alive
// across a numbered menu so selections behave like dashboard clicks.
mod config;
mod dashboard;
mod error;
mod loader;
mod output;
mod reports;
mod session;
mod status;
mod types;
mod util;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Settings;
use dashboard::Dashboard;
use session::Selector;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kpi-dashboard")]
#[command(about = "KPI status and strategic initiative reports from CSV sheets")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./dashboard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// KPI sheet
    #[arg(long, global = true)]
    kpi: Option<PathBuf>,

    /// Strategic initiatives sheet
    #[arg(long, global = true)]
    initiatives: Option<PathBuf>,

    /// Field delimiter: a single character or `tab`
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Reporting month, e.g. `Feb`
    #[arg(long, global = true)]
    period: Option<String>,

    /// Directory for exported files
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Status charts, KPI list for one perspective, incomplete KPIs, initiatives
    Summary {
        #[arg(long)]
        perspective: Option<String>,
        #[arg(long)]
        program: Option<String>,
    },
    /// KPI list for one perspective
    Kpis {
        #[arg(long)]
        perspective: Option<String>,
    },
    /// Monthly series for one KPI
    Detail { code: String },
    /// Initiative donuts and the list for one program
    Initiatives {
        #[arg(long)]
        program: Option<String>,
    },
    /// Write CSV tables and dashboard.json
    Export,
    /// Menu-driven session
    Interactive,
}

/// Load both sheets and print the load line.
fn load(settings: &Settings) -> anyhow::Result<Dashboard> {
    let (dash, report) = Dashboard::load(settings)
        .with_context(|| format!("loading {}", settings.kpi_path.display()))?;
    println!(
        "Processing dataset... ({} KPIs loaded, {} with incomplete data, period {})",
        util::format_int(report.total_rows),
        util::format_int(report.incomplete_rows),
        dash.kpis.period
    );
    Ok(dash)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    resolve_settings_with(cli, |k| std::env::var(k).ok())
}

/// Defaults, then the settings file, then `var`, then CLI flags.
fn resolve_settings_with(
    cli: &Cli,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = config::load_settings_with(cli.config.as_deref(), var)?;
    if let Some(p) = &cli.kpi {
        settings.kpi_path = p.clone();
    }
    if let Some(p) = &cli.initiatives {
        settings.initiatives_path = p.clone();
    }
    if let Some(d) = &cli.delimiter {
        settings.delimiter = config::parse_delimiter(d)
            .with_context(|| format!("invalid delimiter '{d}'"))?;
    }
    if let Some(p) = &cli.period {
        settings.period = Some(p.clone());
    }
    if let Some(p) = &cli.out {
        settings.output_dir = p.clone();
    }
    Ok(settings)
}

fn export(dash: &Dashboard, settings: &Settings) -> anyhow::Result<()> {
    let dir = &settings.output_dir;
    dash.export(dir, chrono::Local::now().to_rfc3339())
        .with_context(|| format!("writing exports to {}", dir.display()))?;
    println!("Outputs saved to {}\n", dir.display());
    Ok(())
}

/// Read one trimmed line after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Numbered pick from `labels`; returns the zero-based index.
fn pick(labels: &[String]) -> Option<usize> {
    for (i, o) in labels.iter().enumerate() {
        println!("[{}] {}", i + 1, o);
    }
    read_line("Enter choice: ")
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < labels.len())
}

fn run_interactive(settings: &Settings) {
    let mut dash: Option<Dashboard> = None;
    loop {
        println!("KPI Dashboard");
        println!("[1] Load the files");
        println!("[2] Show dashboard");
        println!("[3] Filter perspective");
        println!("[4] Show KPI chart");
        println!("[5] Strategic initiatives");
        println!("[6] Filter program");
        println!("[7] Export reports");
        println!("[0] Exit\n");
        let choice = read_line("Enter choice: ");
        if choice == "0" {
            println!("Exiting the program.");
            break;
        }
        if choice == "1" {
            match load(settings) {
                Ok(d) => dash = Some(d),
                Err(e) => eprintln!("Failed to load file: {e:#}\n"),
            }
            continue;
        }
        let Some(d) = dash.as_mut() else {
            println!("Error: No data loaded. Please load the files first (option 1).\n");
            continue;
        };
        match choice.as_str() {
            "2" => print!("{}", d.summary()),
            "3" => {
                if let Ok(selector) = d.session.perspective_mut() {
                    choose(selector);
                }
                print!("{}", d.kpi_list());
            }
            "4" => {
                let code = read_line("Kode KPI: ");
                match d.detail(&code) {
                    Ok(view) => print!("{view}"),
                    Err(e) => println!("Error: {e}\n"),
                }
            }
            "5" => print!("{}", d.initiatives()),
            "6" => {
                if let Ok(selector) = d.session.program_mut() {
                    choose(selector);
                }
                print!("{}", d.initiatives());
            }
            "7" => {
                if let Err(e) = export(d, settings) {
                    eprintln!("Write error: {e:#}\n");
                }
            }
            _ => println!("Invalid choice. Please enter 0-7.\n"),
        }
    }
}

/// Offer the selector's options and switch to the one picked.
fn choose(selector: &mut Selector) {
    if let Some(i) = pick(&selector.labels()) {
        let category = selector.options()[i].clone();
        selector.select(category);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = resolve_settings(&cli)?;

    let command = cli.command.unwrap_or(Command::Summary {
        perspective: None,
        program: None,
    });
    match command {
        Command::Interactive => run_interactive(&settings),
        Command::Summary {
            perspective,
            program,
        } => {
            let mut dash = load(&settings)?;
            dash.apply_filters(perspective, program);
            print!("{}", dash.summary());
        }
        Command::Kpis { perspective } => {
            let mut dash = load(&settings)?;
            dash.apply_filters(perspective, None);
            print!("{}", dash.kpi_list());
        }
        Command::Detail { code } => print!("{}", load(&settings)?.detail(&code)?),
        Command::Initiatives { program } => {
            let mut dash = load(&settings)?;
            dash.apply_filters(None, program);
            print!("{}", dash.initiatives());
        }
        Command::Export => export(&load(&settings)?, &settings)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn cli_flags_override_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "kpi_path = \"file.csv\"\nperiod = \"Jan\"\noutput_dir = \"file-out\"\n",
        )
        .unwrap();
        let env = HashMap::from([
            ("KPI_DASHBOARD_PERIOD", "Feb"),
            ("KPI_DASHBOARD_KPI_PATH", "env.csv"),
            ("KPI_DASHBOARD_DELIMITER", ";"),
        ]);
        let var = |k: &str| env.get(k).map(|v| v.to_string());

        let cli = Cli::try_parse_from([
            "kpi-dashboard",
            "--config",
            path.to_str().unwrap(),
            "summary",
        ])
        .unwrap();
        let settings = resolve_settings_with(&cli, var).unwrap();
        assert_eq!(settings.kpi_path, PathBuf::from("env.csv"));
        assert_eq!(settings.period.as_deref(), Some("Feb"));
        assert_eq!(settings.delimiter, b';');
        assert_eq!(settings.output_dir, PathBuf::from("file-out"));

        let cli = Cli::try_parse_from([
            "kpi-dashboard",
            "--config",
            path.to_str().unwrap(),
            "--kpi",
            "cli.csv",
            "--period",
            "Mar",
            "--delimiter",
            "tab",
            "kpis",
            "--perspective",
            "Financial",
        ])
        .unwrap();
        let settings = resolve_settings_with(&cli, var).unwrap();
        assert_eq!(settings.kpi_path, PathBuf::from("cli.csv"));
        assert_eq!(settings.period.as_deref(), Some("Mar"));
        assert_eq!(settings.delimiter, b'\t');
        assert_eq!(settings.output_dir, PathBuf::from("file-out"));
    }

    #[test]
    fn invalid_delimiter_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "").unwrap();
        let cli = Cli::try_parse_from([
            "kpi-dashboard",
            "--config",
            path.to_str().unwrap(),
            "--delimiter",
            ",;",
        ])
        .unwrap();
        assert!(resolve_settings_with(&cli, |_| None).is_err());
    }
}
