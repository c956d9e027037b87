use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use sqlmigrate_core::{Force, MigrationReport, MigrationStatus};
use sqlmigrate_source::{MigrateConfig, create_migration};
use sqlmigrate_sqlite::{Migrator, SqliteDriver};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for `status`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StatusFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sqlmigrate", version = PACKAGE_VERSION)]
#[command(about = "Reconcile a SQLite database with a directory of SQL migrations")]
struct Cli {
    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Revert orphaned migrations and apply pending ones.
    Up(UpArgs),
    /// Compare the migrations directory with the ledger.
    Status(StatusArgs),
    /// Create the next numbered migration file.
    New(NewArgs),
}

/// Where the project lives and how to override its configuration.
#[derive(Debug, Args)]
struct ProjectArgs {
    /// Project root; relative migration paths resolve against it.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Configuration file (default: <root>/sqlmigrate.yml if present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Migrations directory, overriding the configuration.
    #[arg(long)]
    migrations: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct UpArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    #[command(flatten)]
    project: ProjectArgs,
    /// Ledger table name, overriding the configuration.
    #[arg(long)]
    table: Option<String>,
    /// Revert and re-apply the highest-numbered migration.
    #[arg(long)]
    force_last: bool,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    #[command(flatten)]
    project: ProjectArgs,
    /// Ledger table name, overriding the configuration.
    #[arg(long)]
    table: Option<String>,
    /// Plan as `up --force-last` would.
    #[arg(long)]
    force_last: bool,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: StatusFormat,
}

#[derive(Debug, Args)]
struct NewArgs {
    /// Migration name, e.g. "create users".
    name: String,
    #[command(flatten)]
    project: ProjectArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Up(args) => run_up(args),
        Command::Status(args) => run_status(args),
        Command::New(args) => run_new(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// up
// ---------------------------------------------------------------------------

fn run_up(args: UpArgs) -> Result<(), String> {
    let mut config = load_config(&args.project, args.table.as_deref())?;
    if args.force_last {
        config.force = Some(Force::Last);
    }

    let mut migrator = open_migrator(&args.db, config, &args.project)?;
    let report = migrator
        .up()
        .map_err(|e| format!("Migration failed: {e}"))?;
    print_report(&report);

    migrator
        .into_driver()
        .close()
        .map_err(|e| format!("Failed to close database '{}': {e}", args.db.display()))
}

fn print_report(report: &MigrationReport) {
    if report.is_noop() {
        println!("Database is up to date.");
        return;
    }
    if !report.reverted.is_empty() {
        println!("Reverted: {}", format_ids(&report.reverted));
    }
    if !report.applied.is_empty() {
        println!("Applied: {}", format_ids(&report.applied));
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

fn run_status(args: StatusArgs) -> Result<(), String> {
    let mut config = load_config(&args.project, args.table.as_deref())?;
    if args.force_last {
        config.force = Some(Force::Last);
    }
    let table = config.table_name.clone();

    let mut migrator = open_migrator(&args.db, config, &args.project)?;
    let status = migrator
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))?;

    match args.format {
        StatusFormat::Json => {
            let json = serde_json::to_string_pretty(&status)
                .map_err(|e| format!("Failed to serialize status: {e}"))?;
            println!("{json}");
        }
        StatusFormat::Table => print_status_table(&table, &status),
    }
    Ok(())
}

fn print_status_table(table: &str, status: &MigrationStatus) {
    println!("Ledger table: {table}");
    println!("Applied:");
    if status.applied.is_empty() {
        println!("  (none)");
    }
    for migration in &status.applied {
        match status_label(status, migration.id) {
            Some(label) => println!("  {:>5}  {} ({label})", migration.id, migration.name),
            None => println!("  {:>5}  {}", migration.id, migration.name),
        }
    }
    println!("Revert: {}", format_ids(&status.revertable));
    println!("Pending: {}", format_ids(&status.pending));
    println!(
        "Up to date: {}",
        if status.is_up_to_date() { "yes" } else { "no" }
    );
}

/// Marks applied records the next run reverts, or that are gone from source
/// or were edited since.
fn status_label(status: &MigrationStatus, id: i64) -> Option<&'static str> {
    if status.revertable.contains(&id) {
        Some("will revert")
    } else if status.orphaned.contains(&id) {
        Some("orphaned")
    } else if status.modified.contains(&id) {
        Some("modified")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

fn run_new(args: NewArgs) -> Result<(), String> {
    let config = load_config(&args.project, None)?;
    let dir = config.resolve_migrations_path(&args.project.root);
    let path = create_migration(&dir, &args.name)
        .map_err(|e| format!("Failed to create migration in '{}': {e}", dir.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Loads the configuration file and applies command-line overrides.
fn load_config(project: &ProjectArgs, table: Option<&str>) -> Result<MigrateConfig, String> {
    let mut config = match &project.config {
        Some(path) => MigrateConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => MigrateConfig::load_or_default(&project.root)
            .map_err(|e| format!("Failed to load config from '{}': {e}", project.root.display()))?,
    };
    if let Some(migrations) = &project.migrations {
        config.migrations_path = migrations.clone();
    }
    if let Some(table) = table {
        config.table_name = table.to_string();
    }
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn open_migrator(
    db: &Path,
    config: MigrateConfig,
    project: &ProjectArgs,
) -> Result<Migrator, String> {
    let driver = SqliteDriver::open(db)
        .map_err(|e| format!("Failed to open database '{}': {e}", db.display()))?;
    Migrator::new(driver, config, project.root.clone())
        .map_err(|e| format!("Failed to initialize migrator: {e}"))
}

fn format_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
