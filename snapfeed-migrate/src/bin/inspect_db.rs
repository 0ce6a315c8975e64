use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;
use snapfeed_migrate::{format_table_counts, init_tracing};
use snapfeed_store::config::Settings;
use snapfeed_store::db::schema::{INDEXES, TABLES};
use snapfeed_store::diagram::SchemaMetadata;

/// Database Schema Inspector
///
/// Reports whether a SQLite database carries the Snapfeed tables and
/// indexes, with column details and record counts.
#[derive(Parser, Debug)]
#[command(name = "inspect-db")]
#[command(about = "Inspect a Snapfeed database schema", long_about = None)]
struct Args {
    /// Path to the SQLite database file (defaults to the configured path)
    #[arg(short, long)]
    database: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Settings::with_database_path(args.database.as_deref())
        .context("Failed to load settings")?;
    let path = settings.database.path;

    println!("Snapfeed Database Schema Inspector");
    println!("==================================");
    println!();
    println!("Database: {}", path);
    println!();

    if !std::path::Path::new(&path).exists() {
        println!("❌ Database file not found: {}", path);
        return Ok(());
    }

    let conn = Connection::open(&path).context("Failed to open database connection")?;
    println!("✓ Database file exists and is accessible");
    println!();

    let schema = SchemaMetadata::introspect(&conn).context("Failed to read schema")?;

    println!("Checking for required tables:");
    println!("-----------------------------");
    let mut missing_tables = Vec::new();
    for table_name in TABLES {
        if schema.table(table_name).is_some() {
            println!("  ✓ {} (exists)", table_name);
        } else {
            println!("  ❌ {} (MISSING)", table_name);
            missing_tables.push(table_name);
        }
    }

    println!();
    println!("Table Details:");
    println!("--------------");
    for table in TABLES.iter().filter_map(|name| schema.table(name)) {
        println!();
        println!("Table: {}", table.name);
        println!("Columns:");
        for col in &table.columns {
            let pk_marker = if col.primary_key { " (PRIMARY KEY)" } else { "" };
            let null_marker = if col.not_null { " NOT NULL" } else { "" };
            let unique_marker = if col.unique { " UNIQUE" } else { "" };
            println!(
                "  - {} : {}{}{}{}",
                col.name, col.type_name, null_marker, unique_marker, pk_marker
            );
        }
        for fk in &table.foreign_keys {
            println!(
                "  → {} references {}({}) on delete {}",
                fk.from_column, fk.to_table, fk.to_column, fk.on_delete
            );
        }
    }

    println!();
    println!("Checking for indexes:");
    println!("---------------------");
    for index_name in INDEXES {
        if check_index_exists(&conn, index_name)? {
            println!("  ✓ {}", index_name);
        } else {
            println!("  ❌ {} (MISSING)", index_name);
        }
    }

    println!();
    println!("Record Counts:");
    println!("--------------");
    let mut counts = Vec::new();
    for table_name in TABLES {
        if schema.table(table_name).is_some() {
            counts.push((table_name, count_records(&conn, table_name)?));
        }
    }
    print!("{}", format_table_counts(&counts));

    println!();
    println!("Summary:");
    println!("--------");
    if missing_tables.is_empty() {
        println!("✓ All required tables exist");
    } else {
        println!("❌ Missing tables: {}", missing_tables.join(", "));
        println!("⚠️  Run snapfeed-migrate --database {} to create them", path);
    }

    Ok(())
}

fn check_index_exists(conn: &Connection, index_name: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?",
        [index_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn count_records(conn: &Connection, table_name: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table_name),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
