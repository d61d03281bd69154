/// Per-message filtering and dispatch to the formatter
use super::config::read_logger_config;
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules, in order:
/// 1. Errors are always shown
/// 2. With --log-tags, other tags are dropped
/// 3. --quiet (threshold Error) drops everything else
/// 4. Debug requires --debug-<tag> or --verbose-<tag>
/// 5. Verbose requires --verbose or --verbose-<tag>
/// 6. Warning and Info are compared against the threshold
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = read_logger_config();
    if !config.tag_enabled(tag) || config.min_level == LogLevel::Error {
        return false;
    }

    match level {
        LogLevel::Debug => config.debug_enabled_for(tag),
        LogLevel::Verbose => config.verbose_enabled_for(tag),
        _ => level <= config.min_level,
    }
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}
