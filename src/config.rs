//! Configuration module for sentinela.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Provides the default value for database_url.
fn default_database_url() -> String {
    "sqlite:sentinela.db".to_string()
}

/// Provides the default value for company_id_prefix.
fn default_company_id_prefix() -> String {
    "comp".to_string()
}

/// Application configuration for sentinela.
///
/// The expiry policy values (warning window, alert cooldown) are fixed
/// constants in the engine, not configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Prefix used when generating ids for newly registered companies.
    #[serde(default = "default_company_id_prefix")]
    pub company_id_prefix: String,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory,
    /// with `SENTINELA__`-prefixed environment variables taking precedence.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)).required(false))
            .add_source(Environment::with_prefix("SENTINELA").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
