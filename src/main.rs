use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod builder;
mod config;
mod deck;
mod error;
mod form;
mod ingest;
mod models;
mod session;
mod status;

use config::Settings;
use session::Session;

#[derive(Parser)]
#[command(name = "kpi-deck")]
#[command(about = "Marketing KPI status classifier and slide-deck generator", long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/kpi-deck/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Company name shown in the deck title and file name
    #[arg(long, global = true, env = "KPI_DECK_COMPANY_NAME")]
    company_name: Option<String>,
    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a KPI spreadsheet and print each KPI's status
    Check {
        #[arg(long)]
        input: PathBuf,
        /// Fail on the first invalid row instead of skipping it
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
    /// Build the status deck from a KPI spreadsheet
    Generate {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to Marketing_KPI_Dashboard_<company>.pptx
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fail on the first invalid row instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Enter KPIs by hand (interactively, or with --kpi) and build the deck
    Manual {
        #[arg(long = "kpi", value_name = "TYPE|NAME|BENCHMARK|ACTUAL|DIRECTION")]
        kpis: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a CSV template with the required columns
    Template {
        #[arg(long, default_value = "kpi_template.csv")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())
        .context("failed to load settings")?
        .with_company_name(cli.company_name);
    let mut session = Session::new(settings);

    match cli.command {
        Commands::Check {
            input,
            strict,
            json,
        } => {
            load_table(&mut session, &input, strict)?;
            if json {
                print_json(&session)?;
            } else {
                print_summary(&session, &input);
            }
        }
        Commands::Generate { input, out, strict } => {
            load_table(&mut session, &input, strict)?;
            for issue in session.issues() {
                eprintln!("Skipped {issue}");
            }
            write_deck(&session, out)?;
        }
        Commands::Manual { kpis, out } => {
            if kpis.is_empty() {
                let stdin = io::stdin();
                form::run(&mut session, &mut stdin.lock(), &mut io::stdout())
                    .context("failed to read manual entries")?;
            } else {
                for spec in &kpis {
                    match session.add_manual(form::parse_entry(spec)) {
                        Ok(record) => {
                            println!("Added: {} ({})", record.kpi_name(), record.status())
                        }
                        Err(issue) => eprintln!("Not added: --kpi {spec:?}: {}", issue.error),
                    }
                }
            }
            write_deck(&session, out)?;
        }
        Commands::Template { out } => {
            ingest::write_template(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Template written to {}.", out.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_table(session: &mut Session, input: &Path, strict: bool) -> anyhow::Result<()> {
    let rows = ingest::read_table(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    if strict {
        if let Err(issue) = session.ingest_strict(&rows) {
            bail!("{issue} (aborted: --strict)");
        }
    } else {
        session.ingest(&rows);
    }
    Ok(())
}

fn print_summary(session: &Session, input: &Path) {
    let records = session.records();
    if records.is_empty() {
        println!("No valid KPIs found in {}.", input.display());
    } else {
        println!("{} KPIs from {}:", records.len(), input.display());
        for record in records {
            println!(
                "- {} / {}: actual {} vs benchmark {} ({}) -> {}",
                record.campaign_type(),
                record.kpi_name(),
                ingest::format_number(record.actual()),
                ingest::format_number(record.benchmark()),
                record.direction(),
                record.status()
            );
        }
        println!("Status summary: {}", session.counts());
    }

    if !session.issues().is_empty() {
        println!("Skipped {} rows:", session.issues().len());
        for issue in session.issues() {
            println!("- {issue}");
        }
    }
}

fn print_json(session: &Session) -> anyhow::Result<()> {
    let document = serde_json::json!({
        "ok": session.issues().is_empty(),
        "session": session.id(),
        "settings": session.settings(),
        "counts": session.counts(),
        "records": session.records(),
        "issues": session.issues(),
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn write_deck(session: &Session, out: Option<PathBuf>) -> anyhow::Result<()> {
    let bytes = session.render_deck(Utc::now())?;
    let out = out.unwrap_or_else(|| PathBuf::from(session.deck_file_name()));
    fs::write(&out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    let counts = session.counts();
    println!(
        "Deck written to {} ({} KPIs, {}).",
        out.display(),
        counts.total(),
        counts
    );
    Ok(())
}
