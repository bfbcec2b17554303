//! Configuration
//!
//! Settings come from `config.toml` in the user configuration directory,
//! then environment variables, then command-line flags. A missing file
//! means defaults.

pub mod layout;
pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use layout::{CrmLayout, DarioLayout};

const APP_DIR: &str = "activity-import";
const CONFIG_FILE: &str = "config.toml";
pub const DATABASE_ENV: &str = "ACTIVITY_IMPORT_DATABASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the staging tables
    pub database_path: PathBuf,
    /// Default `env_logger` filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub crm: CrmLayout,
    pub dario: DarioLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("Setup.db"),
            log_level: "info".to_string(),
            crm: CrmLayout::default(),
            dario: DarioLayout::default(),
        }
    }
}

impl Config {
    /// Load the config file if present and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                self.database_path = PathBuf::from(path.trim());
            }
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Open the database, creating the file if needed
    pub async fn connect(&self) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", self.database_path.display()))?;

        log::debug!("Connected to {}", self.database_path.display());
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_path, PathBuf::from("Setup.db"));
        assert_eq!(config.crm.hours_column, 10);
        assert_eq!(config.dario.width, 11);
    }

    #[test]
    fn test_nested_layout_overrides() {
        let config = Config::from_toml_str(
            r#"
            database_path = "/tmp/activities.db"
            log_level = "debug"

            [crm]
            header_scan_rows = 30

            [dario]
            first_data_row = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/activities.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.crm.header_scan_rows, 30);
        assert_eq!(config.crm.min_data_row, 4);
        assert_eq!(config.dario.first_data_row, 3);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("database_path = [").is_err());
    }

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("Setup.db"),
            ..Config::default()
        };
        let pool = config.connect().await.unwrap();
        repository::staging::ensure_schema(&pool).await.unwrap();
        assert!(config.database_path.exists());
    }
}
