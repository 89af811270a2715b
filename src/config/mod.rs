/// Configuration management for the HRMS service
///
/// Handles server bind settings and the location of the SQLite database.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the database file created inside `DatabaseConfig::data_dir`
pub const DATABASE_FILE: &str = "hrms.db";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    pub data_dir: String,
}

impl DatabaseConfig {
    /// Full path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DATABASE_FILE)
    }
}

impl Config {
    /// Configuration pointing at an explicit data directory, everything else default
    pub fn with_data_dir(data_dir: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.database.data_dir = data_dir.into();
        config
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("HRMS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("HRMS_PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("HRMS_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_joins_data_dir() {
        let config = Config::with_data_dir("/tmp/hrms-test");
        assert_eq!(
            config.database.database_path(),
            PathBuf::from("/tmp/hrms-test/hrms.db")
        );
    }
}
