// Shared setup for the snapfeed-migrate binaries

use std::fmt::Write as _;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load `.env` and install the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapfeed_store=info,snapfeed_migrate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Render per-table row counts as an aligned block
pub fn format_table_counts(counts: &[(&str, i64)]) -> String {
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in counts {
        let _ = writeln!(out, "  {:<width$} : {} records", name, count, width = width);
    }
    out
}
