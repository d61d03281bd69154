/// Configuration utilities - loading, reloading, and access helpers
use super::schemas::{CacheConfig, ChartConfig, Config, ServerConfig};
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

/// Global configuration instance
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from the default path and initialize the global CONFIG
pub fn load_config() -> Result<(), ConfigError> {
    load_config_from_path(CONFIG_FILE_PATH)
}

/// Load configuration from a specific file path
///
/// A missing file is not an error: schema defaults are used instead.
pub fn load_config_from_path(path: &str) -> Result<(), ConfigError> {
    let config = if Path::new(path).exists() {
        read_config_file(path)?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        Config::default()
    };

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Reload configuration from disk, atomically replacing the current one
pub fn reload_config_from_path(path: &str) -> Result<(), ConfigError> {
    let new_config = read_config_file(path)?;
    let lock = CONFIG.get().ok_or(ConfigError::NotInitialized)?;
    *lock.write() = new_config;
    logger::info(LogTag::Config, &format!("Configuration reloaded from '{}'", path));
    Ok(())
}

/// Parse a TOML config file without touching the global instance
pub fn read_config_file(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let config = toml::from_str::<Config>(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    if let Ok(table) = contents.parse::<toml::Table>() {
        for key in unknown_keys(&table) {
            logger::warning(
                LogTag::Config,
                &format!("Unknown key '{}' in '{}' is ignored", key, path),
            );
        }
    }

    Ok(config)
}

/// Dotted paths of keys no config section accepts
///
/// `charts.symbols` holds free-form symbol tables and is not descended into.
pub fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut unknown = Vec::new();
    for (section, value) in table {
        let fields = match section.as_str() {
            "server" => ServerConfig::FIELDS,
            "cache" => CacheConfig::FIELDS,
            "charts" => ChartConfig::FIELDS,
            _ => {
                unknown.push(section.clone());
                continue;
            }
        };
        if let Some(entries) = value.as_table() {
            unknown.extend(
                entries
                    .keys()
                    .filter(|key| !fields.contains(&key.as_str()))
                    .map(|key| format!("{}.{}", section, key)),
            );
        }
    }
    unknown
}

/// Execute a function with read access to the configuration
///
/// Falls back to schema defaults when `load_config()` was never called, so
/// library users that configure components explicitly need no global setup.
///
/// # Example
/// ```
/// use marketdash::config::with_config;
///
/// let dedupe_ms = with_config(|cfg| cfg.cache.dedupe_interval_ms);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration (for use across await points)
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

pub fn is_config_initialized() -> bool {
    CONFIG.get().is_some()
}
