use anyhow::{Context, Result};
use clap::Parser;
use snapfeed_migrate::{format_table_counts, init_tracing};
use snapfeed_store::config::Settings;
use snapfeed_store::Database;

/// Snapfeed Schema Migration Utility
///
/// Creates the Snapfeed tables and indexes in a SQLite database (a no-op for
/// tables that already exist) and optionally loads demo data.
#[derive(Parser, Debug)]
#[command(name = "snapfeed-migrate")]
#[command(about = "Create or upgrade a Snapfeed database", long_about = None)]
struct Args {
    /// Path to the SQLite database file (defaults to the configured path)
    #[arg(short, long)]
    database: Option<String>,

    /// Load demo users, posts, comments, likes and follows
    #[arg(long)]
    seed: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut settings = Settings::with_database_path(args.database.as_deref())
        .context("Failed to load settings")?;
    if args.seed {
        settings.database.seed_demo_data = true;
    }

    println!("Snapfeed Schema Migration");
    println!("=========================");
    println!();
    println!("Database: {}", settings.database.path);

    let db = Database::from_settings(&settings.database)
        .with_context(|| format!("Failed to prepare database {}", settings.database.path))?;

    if settings.database.seed_demo_data {
        println!("✓ Schema ready, demo data loaded");
    } else {
        println!("✓ Schema ready");
    }

    println!();
    println!("Record Counts:");
    println!("--------------");
    print!("{}", format_table_counts(&db.table_counts()?));

    Ok(())
}
