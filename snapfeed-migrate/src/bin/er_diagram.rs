use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use snapfeed_migrate::init_tracing;
use snapfeed_store::diagram::{render, DiagramFormat, SchemaMetadata};
use snapfeed_store::Database;

/// ER Diagram Generator
///
/// Introspects a Snapfeed schema and renders its tables and foreign keys.
/// Without --database the current schema is built in memory, so the diagram
/// always reflects the code.
#[derive(Parser, Debug)]
#[command(name = "er-diagram")]
#[command(about = "Render the Snapfeed entity-relationship diagram", long_about = None)]
struct Args {
    /// Existing SQLite database to introspect
    #[arg(short, long)]
    database: Option<String>,

    /// Output format: mermaid or dot
    #[arg(short, long, default_value = "mermaid")]
    format: DiagramFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let db = match &args.database {
        Some(path) => {
            if !std::path::Path::new(path).exists() {
                bail!("Database file not found: {}", path);
            }
            Database::new(path)?
        }
        None => {
            let db = Database::in_memory()?;
            db.initialize()?;
            db
        }
    };

    let conn = db.connection()?;
    let schema = SchemaMetadata::introspect(&conn).context("Failed to read schema")?;
    let diagram = render(&schema, args.format);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &diagram)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                format = args.format.as_str(),
                tables = schema.tables.len(),
                "Diagram written"
            );
        }
        None => print!("{}", diagram),
    }

    Ok(())
}
