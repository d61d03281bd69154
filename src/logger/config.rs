//! Logger configuration derived from command-line flags

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments::{get_arg_value, get_cmd_args, has_arg};
use once_cell::sync::Lazy;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped
    pub min_level: LogLevel,
    /// Tags with --debug-<tag>
    pub debug_tags: HashSet<String>,
    /// Tags with --verbose-<tag>
    pub verbose_tags: HashSet<String>,
    /// Empty = all tags enabled
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the logger configuration from the stored command-line arguments
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    if has_arg("--quiet") {
        config.min_level = LogLevel::Error;
    }
    if has_arg("--verbose") {
        config.min_level = LogLevel::Verbose;
    }
    if let Some(value) = get_arg_value("--log-level") {
        match value.parse::<LogLevel>() {
            Ok(level) => config.min_level = level,
            Err(e) => eprintln!("Ignoring --log-level: {}", e),
        }
    }

    let args = get_cmd_args();
    for arg in &args {
        if let Some(key) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(key.to_lowercase());
        } else if let Some(key) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(key.to_lowercase());
        }
    }

    if let Some(tags) = get_arg_value("--log-tags") {
        config.enabled_tags = tags
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
    }

    set_logger_config(config);
}

/// Read access without cloning, for the per-message filter
pub(super) fn read_logger_config() -> RwLockReadGuard<'static, LoggerConfig> {
    LOGGER_CONFIG.read()
}

impl LoggerConfig {
    /// `--debug-<tag>` or `--verbose-<tag>` was given
    pub fn debug_enabled_for(&self, tag: &LogTag) -> bool {
        let key = tag.to_debug_key();
        self.debug_tags.contains(&key) || self.verbose_tags.contains(&key)
    }

    pub fn verbose_enabled_for(&self, tag: &LogTag) -> bool {
        self.min_level == LogLevel::Verbose || self.verbose_tags.contains(&tag.to_debug_key())
    }

    /// `--log-tags` is unset or names this tag
    pub fn tag_enabled(&self, tag: &LogTag) -> bool {
        self.enabled_tags.is_empty() || self.enabled_tags.contains(&tag.to_debug_key())
    }
}
