use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Default pool size for file-backed databases.
pub const DEFAULT_POOL_SIZE: u32 = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Optional snapfeed.toml in the working directory
        let current_dir_path = PathBuf::from("snapfeed.toml");
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        builder = builder
            .set_default("database.path", "snapfeed.db")?
            .set_default("database.pool_size", i64::from(DEFAULT_POOL_SIZE))?
            .set_default("database.seed_demo_data", false)?;

        // 2. Environment variables win over the file
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(pool_size) = std::env::var("DATABASE_POOL_SIZE") {
            builder = builder.set_override("database.pool_size", pool_size)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Settings resolved from config, with the database path replaced when the
    /// caller passed one explicitly (e.g. a `--database` flag).
    pub fn with_database_path(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut settings = Self::new()?;
        if let Some(path) = path {
            settings.database.path = path.to_string();
        }
        Ok(settings)
    }
}
