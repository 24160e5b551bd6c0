use crate::core::db::connection::ConnectionConfig;
use crate::core::{KeysqlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// use keysql::config::load_config;
///
/// let config = load_config("keysql.toml").expect("Failed to load config");
/// println!("{:?}", config.connection.host);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| KeysqlError::Config(e.to_string()))?;
    toml::from_str(&content).map_err(|e| KeysqlError::Config(e.to_string()))
}
