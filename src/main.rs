// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use location_tracker::{
    aggregate, count_sales, load_locations_csv, load_sales_csv, LocationStore, Settings,
    SqliteStore,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Parser)]
#[command(name = "location-tracker", version, about = "Manage locations and rank them by sales activity")]
struct Cli {
    /// Config file (defaults to ./locations.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides config and environment
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive locations screen (default)
    Ui,
    /// Import locations and/or sales from CSV files
    Import {
        #[arg(long)]
        locations: Option<PathBuf>,
        #[arg(long)]
        sales: Option<PathBuf>,
    },
    /// Print locations ranked by activity
    Rank {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        settings.database_path = db;
    }

    let command = cli.command.unwrap_or(Command::Ui);
    init_logging(&settings, matches!(command, Command::Ui))?;
    settings.ensure_database_dir()?;

    match command {
        Command::Ui => run_ui_mode(&settings),
        Command::Import { locations, sales } => run_import(&settings, locations, sales),
        Command::Rank { json } => run_rank(&settings, json),
    }
}

/// Log to stderr, except in the TUI where stderr would corrupt the screen
fn init_logging(settings: &Settings, interactive: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(settings.log_filter.as_str());

    if !interactive {
        builder.with_writer(std::io::stderr).init();
        return Ok(());
    }

    match &settings.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }

    Ok(())
}

fn run_import(
    settings: &Settings,
    locations_csv: Option<PathBuf>,
    sales_csv: Option<PathBuf>,
) -> Result<()> {
    println!("🗄️  Data Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if locations_csv.is_none() && sales_csv.is_none() {
        anyhow::bail!("nothing to import: pass --locations and/or --sales");
    }

    let store = SqliteStore::open(&settings.database_path)?;
    println!("✓ Database ready: {}", settings.database_path.display());

    if let Some(path) = locations_csv {
        let locations = load_locations_csv(&path)?;
        let inserted = store.import_locations(&locations)?;
        println!(
            "✓ Locations: {} loaded, {} inserted, {} already present",
            locations.len(),
            inserted,
            locations.len() - inserted
        );
    }

    if let Some(path) = sales_csv {
        let sales = load_sales_csv(&path)?;
        let inserted = store.import_sales(&sales)?;
        println!(
            "✓ Sales: {} loaded, {} inserted, {} duplicates skipped",
            sales.len(),
            inserted,
            sales.len() - inserted
        );
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✅ Database contains {} locations and {} sales",
        store.locations()?.len(),
        count_sales(store.connection())?
    );

    Ok(())
}

fn run_rank(settings: &Settings, json: bool) -> Result<()> {
    let store = SqliteStore::open(&settings.database_path)?;
    let snapshot = store.snapshot()?;
    let ranked = aggregate(&snapshot.locations, &snapshot.sales);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("{}", location_tracker::view::EMPTY_PLACEHOLDER);
        return Ok(());
    }

    println!("{:<4} {:<28} {:<16} {:>8} {:>12}", "#", "Location", "Category", "Score", "Transactions");
    for (i, row) in ranked.iter().enumerate() {
        println!(
            "{:<4} {:<28} {:<16} {:>7.1}% {:>12}",
            i + 1,
            row.location.name,
            row.location.category.label(),
            row.score,
            row.transactions
        );
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings) -> Result<()> {
    let store = SqliteStore::open(&settings.database_path)?;
    tracing::info!(path = %settings.database_path.display(), "starting locations screen");

    let mut app = ui::App::new(store)?;
    ui::run_ui(&mut app)?;

    println!("✅ UI closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings) -> Result<()> {
    anyhow::bail!(
        "TUI mode not available; rebuild with `--features tui` or run the location-server binary"
    )
}
